/*******************************************************************************
*   (c) 2022-2024 Zondax AG
*
*  Licensed under the Apache License, Version 2.0 (the "License");
*  you may not use this file except in compliance with the License.
*  You may obtain a copy of the License at
*
*      http://www.apache.org/licenses/LICENSE-2.0
*
*  Unless required by applicable law or agreed to in writing, software
*  distributed under the License is distributed on an "AS IS" BASIS,
*  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
*  See the License for the specific language governing permissions and
*  limitations under the License.
********************************************************************************/
//! Two-phase transaction building with detached signing
//!
//! [`Builder::build`] assembles an unsigned transaction from caller
//! supplied UTXO sets and exposes the per-input signature hashes; the
//! signatures are produced elsewhere (an HSM, a remote signer, a plain
//! in-process key) and injected afterwards. Key management therefore never
//! has to touch the funding I/O.

use crate::address::{self, Address, Network};
use crate::config::{DUST_THRESHOLD, TX_FEE};
use crate::data::Utxo;
use crate::errors::Error;
use crate::funding::{self, FundingPlan};
use crate::script::{hash160, ScriptBuilder};
use crate::sighash::{signature_hash, SigHashCache, SIGHASH_ALL};
use crate::transaction::ZecTx;

/// Builds transactions from caller supplied funding
pub struct Builder {
    network: Network,
    fee: i64,
    dust: i64,
}

impl Builder {
    pub fn new(network: Network) -> Self {
        Self { network, fee: TX_FEE, dust: DUST_THRESHOLD }
    }

    /// Assemble an unsigned transaction sending `value` to `to`
    ///
    /// `master_utxos` fund the transaction from the key holder's own P2PKH
    /// address. When `contract` is given, `contract_utxos` are additionally
    /// spent from the contract's P2SH address, with the contract itself as
    /// the signing subscript for those inputs. `value == 0` is only
    /// meaningful with a contract and sends everything to change.
    pub fn build(
        &self,
        public_key: &secp256k1::PublicKey,
        to: &str,
        contract: Option<&[u8]>,
        value: i64,
        master_utxos: &[Utxo],
        contract_utxos: &[Utxo],
    ) -> Result<Tx, Error> {
        if value < self.fee + self.dust && (value != 0 || contract.is_none()) {
            return Err(Error::AmountTooSmall);
        }

        let serialized_key = address::serialize_public_key(public_key, self.network)?;
        let from = address::public_key_to_address(&serialized_key, self.network);
        let to_addr = Address::decode(to, self.network)?;

        let mut tx = ZecTx::sapling();

        let master_plan = FundingPlan::all(master_utxos)?;
        for (outpoint, _) in &master_plan.inputs {
            tx.add_input(*outpoint);
        }
        let n_master = master_plan.inputs.len();

        let contract_plan = match contract {
            Some(_) => {
                let plan = FundingPlan::all(contract_utxos)?;
                for (outpoint, _) in &plan.inputs {
                    tx.add_input(*outpoint);
                }
                plan
            }
            None => FundingPlan::default(),
        };

        let total_in = master_plan.total_in + contract_plan.total_in;
        if total_in < value + self.fee {
            return Err(Error::InsufficientBalance {
                address: from.encode(),
                required: value + self.fee,
                current: total_in,
            });
        }

        log::info!(
            "spending {} outputs ({} zatoshi) from {}",
            tx.vin.len(),
            total_in,
            from
        );

        if value > 0 {
            tx.add_output(value, to_addr.script_pubkey());
        }

        if let Some(change) = funding::change_value(total_in, value, self.fee) {
            tx.add_output(change, from.script_pubkey());
        }

        let cache = SigHashCache::new(&tx)?;
        let mut digests = Vec::with_capacity(tx.vin.len());
        for (i, (_, amount)) in master_plan.inputs.iter().enumerate() {
            digests.push(signature_hash(
                &tx,
                &cache,
                i as u32,
                &master_plan.script_pubkey,
                *amount,
                SIGHASH_ALL,
            )?);
        }
        if let Some(contract) = contract {
            for (i, (_, amount)) in contract_plan.inputs.iter().enumerate() {
                digests.push(signature_hash(
                    &tx,
                    &cache,
                    (n_master + i) as u32,
                    contract,
                    *amount,
                    SIGHASH_ALL,
                )?);
            }
        }

        Ok(Tx {
            tx,
            digests,
            n_master,
            contract: contract.map(|c| c.to_vec()),
            public_key: serialized_key,
            signed: false,
        })
    }
}

/// An assembled transaction waiting for its detached signatures
#[derive(Clone, Debug)]
pub struct Tx {
    tx: ZecTx,
    digests: Vec<[u8; 32]>,
    n_master: usize,
    contract: Option<Vec<u8>>,
    public_key: Vec<u8>,
    signed: bool,
}

impl Tx {
    /// Per-input signature hashes, in input order
    pub fn digests(&self) -> &[[u8; 32]] {
        &self.digests
    }

    pub fn transaction(&self) -> &ZecTx {
        &self.tx
    }

    /// Install one DER signature per input, in input order
    ///
    /// Inputs past the master group additionally carry the contract push,
    /// satisfying the P2SH spend.
    pub fn inject_signatures(
        &mut self,
        signatures: &[secp256k1::ecdsa::Signature],
    ) -> Result<(), Error> {
        if signatures.len() != self.digests.len() {
            return Err(Error::SigCountMismatch {
                expected: self.digests.len(),
                got: signatures.len(),
            });
        }

        for (i, signature) in signatures.iter().enumerate() {
            let mut der = signature.serialize_der().to_vec();
            der.push(SIGHASH_ALL);

            let mut builder = ScriptBuilder::new();
            builder.push_data(&der).push_data(&self.public_key);
            if i >= self.n_master {
                if let Some(contract) = &self.contract {
                    builder.push_data(contract);
                }
            }
            self.tx.vin[i].script_sig = builder.script();
        }
        self.signed = true;
        Ok(())
    }

    /// Serialized transaction, available once signatures were injected
    pub fn signed_bytes(&self) -> Result<Vec<u8>, Error> {
        if !self.signed {
            return Err(Error::Unsigned);
        }
        self.tx.to_bytes()
    }

    pub fn txid_hex(&self) -> Result<String, Error> {
        self.tx.txid_hex()
    }
}

/// P2SH address of a redeem script
pub fn contract_address(contract: &[u8], network: Network) -> Address {
    Address::script_hash(hash160(contract), network)
}
