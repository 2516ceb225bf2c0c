//! In-memory chain double implementing the indexer interface
//!
//! Published transactions are decoded and applied to the UTXO set
//! synchronously, so post-conditions hold by the first poll.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use zec_account::{ClientCore, ClientError};
use zec_tx_builder::script::pushed_data;
use zec_tx_builder::{public_key_to_address, Address, Network, Utxo};

#[derive(Clone)]
pub struct MockChain {
    network: Network,
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    utxos: HashMap<String, Vec<Utxo>>,
    received: HashMap<String, i64>,
    spent: HashMap<String, i64>,
    spenders: HashMap<String, (String, String)>,
    minted: u8,
}

impl MockChain {
    pub fn new(network: Network) -> Self {
        Self { network, state: Arc::new(Mutex::new(State::default())) }
    }

    /// Credit `address` with a fresh unspent output
    pub fn mint(&self, address: &Address, amount: i64) {
        let mut state = self.state.lock().unwrap();
        state.minted += 1;
        let utxo = Utxo {
            tx_hash: hex::encode([state.minted; 32]),
            vout: 0,
            amount,
            script_pubkey: hex::encode(address.script_pubkey()),
        };
        let key = address.encode();
        state.utxos.entry(key.clone()).or_default().push(utxo);
        *state.received.entry(key).or_default() += amount;
    }

    fn balance_of(state: &State, address: &str) -> i64 {
        state
            .utxos
            .get(address)
            .map(|utxos| utxos.iter().map(|u| u.amount).sum())
            .unwrap_or(0)
    }
}

#[async_trait]
impl ClientCore for MockChain {
    fn network(&self) -> Network {
        self.network
    }

    async fn get_utxos(
        &self,
        address: &str,
        limit: u64,
        _confirmations: u64,
    ) -> Result<Vec<Utxo>, ClientError> {
        let state = self.state.lock().unwrap();
        let mut utxos = state.utxos.get(address).cloned().unwrap_or_default();
        utxos.truncate(limit as usize);
        Ok(utxos)
    }

    async fn confirmations(&self, _tx_hash: &str) -> Result<u64, ClientError> {
        Ok(6)
    }

    async fn script_funded(
        &self,
        address: &str,
        value: i64,
    ) -> Result<(bool, i64), ClientError> {
        let state = self.state.lock().unwrap();
        let received = state.received.get(address).copied().unwrap_or(0);
        Ok((received >= value, received))
    }

    async fn script_redeemed(
        &self,
        address: &str,
        value: i64,
    ) -> Result<(bool, i64), ClientError> {
        let state = self.state.lock().unwrap();
        let spent = state.spent.get(address).copied().unwrap_or(0);
        Ok((spent >= value, Self::balance_of(&state, address)))
    }

    async fn script_spent(
        &self,
        address: &str,
        spender: &str,
    ) -> Result<(bool, String), ClientError> {
        let state = self.state.lock().unwrap();
        match state.spenders.get(address) {
            Some((by, sig_script)) if by == spender => Ok((true, sig_script.clone())),
            _ => Ok((false, String::new())),
        }
    }

    async fn publish_transaction(&self, signed_tx: &[u8]) -> Result<(), ClientError> {
        let parsed = parse_tx(signed_tx).map_err(|message| ClientError::Api {
            status: 400,
            message,
        })?;
        let tx_hash = display_tx_hash(signed_tx);

        let mut state = self.state.lock().unwrap();

        for input in &parsed.inputs {
            let located = state.utxos.iter().find_map(|(address, utxos)| {
                utxos
                    .iter()
                    .position(|u| u.tx_hash == input.tx_hash && u.vout == input.vout)
                    .map(|at| (address.clone(), at))
            });
            let (address, at) = located.ok_or_else(|| ClientError::Api {
                status: 400,
                message: format!("unknown outpoint {}:{}", input.tx_hash, input.vout),
            })?;

            let utxo = state.utxos.get_mut(&address).unwrap().remove(at);
            *state.spent.entry(address.clone()).or_default() += utxo.amount;

            if let Some(spender) = spender_of(&input.script_sig, self.network) {
                state
                    .spenders
                    .insert(address, (spender, hex::encode(&input.script_sig)));
            }
        }

        for (vout, (amount, script_pubkey)) in parsed.outputs.iter().enumerate() {
            if let Some(address) = Address::from_script_pubkey(script_pubkey, self.network) {
                let key = address.encode();
                state.utxos.entry(key.clone()).or_default().push(Utxo {
                    tx_hash: tx_hash.clone(),
                    vout: vout as u32,
                    amount: *amount,
                    script_pubkey: hex::encode(script_pubkey),
                });
                *state.received.entry(key).or_default() += amount;
            }
        }
        Ok(())
    }
}

/// Spender derived from the second push of a standard signature script
fn spender_of(script_sig: &[u8], network: Network) -> Option<String> {
    let pushes = pushed_data(script_sig).ok()?;
    let public_key = pushes.get(1)?;
    Some(public_key_to_address(public_key, network).encode())
}

fn display_tx_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(Sha256::digest(bytes));
    let mut tx_hash: [u8; 32] = digest.into();
    tx_hash.reverse();
    hex::encode(tx_hash)
}

struct ParsedInput {
    tx_hash: String,
    vout: u32,
    script_sig: Vec<u8>,
}

struct ParsedTx {
    inputs: Vec<ParsedInput>,
    outputs: Vec<(i64, Vec<u8>)>,
}

struct Reader<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], String> {
        let slice = self
            .bytes
            .get(self.at .. self.at + n)
            .ok_or("truncated transaction")?;
        self.at += n;
        Ok(slice)
    }

    fn u32_le(&mut self) -> Result<u32, String> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    fn i64_le(&mut self) -> Result<i64, String> {
        let bytes = self.take(8)?;
        Ok(i64::from_le_bytes(bytes.try_into().unwrap()))
    }

    fn compact_size(&mut self) -> Result<u64, String> {
        let first = self.take(1)?[0];
        Ok(match first {
            0xFD => u16::from_le_bytes(self.take(2)?.try_into().unwrap()) as u64,
            0xFE => u32::from_le_bytes(self.take(4)?.try_into().unwrap()) as u64,
            0xFF => u64::from_le_bytes(self.take(8)?.try_into().unwrap()),
            n => n as u64,
        })
    }

    fn var_bytes(&mut self) -> Result<Vec<u8>, String> {
        let len = self.compact_size()? as usize;
        Ok(self.take(len)?.to_vec())
    }
}

fn parse_tx(bytes: &[u8]) -> Result<ParsedTx, String> {
    let mut reader = Reader { bytes, at: 0 };

    let header = reader.u32_le()?;
    if header != 0x8000_0004 {
        return Err(format!("unexpected version header {header:#X}"));
    }
    let _version_group_id = reader.u32_le()?;

    let n_inputs = reader.compact_size()?;
    let mut inputs = Vec::with_capacity(n_inputs as usize);
    for _ in 0 .. n_inputs {
        let mut hash: [u8; 32] = reader.take(32)?.try_into().unwrap();
        hash.reverse();
        let vout = reader.u32_le()?;
        let script_sig = reader.var_bytes()?;
        let _sequence = reader.u32_le()?;
        inputs.push(ParsedInput { tx_hash: hex::encode(hash), vout, script_sig });
    }

    let n_outputs = reader.compact_size()?;
    let mut outputs = Vec::with_capacity(n_outputs as usize);
    for _ in 0 .. n_outputs {
        let value = reader.i64_le()?;
        let script_pubkey = reader.var_bytes()?;
        outputs.push((value, script_pubkey));
    }

    // lock time, expiry, value balance and the empty shielded vectors are
    // not needed to apply the transaction
    Ok(ParsedTx { inputs, outputs })
}
