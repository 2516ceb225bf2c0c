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
//! Accounts that build, sign and submit transactions end to end

use std::time::Duration;

use async_trait::async_trait;

use zec_tx_builder::config::{TX_FEE, UTXO_LIMIT};
use zec_tx_builder::funding::FundingPlan;
use zec_tx_builder::script::hash160;
use zec_tx_builder::secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use zec_tx_builder::sighash::{signature_hash, SigHashCache, SIGHASH_ALL};
use zec_tx_builder::{Address, Error as BuilderError, ScriptBuilder, ZecTx};

use crate::cancel::Cancel;
use crate::client::Client;
use crate::errors::AccountError;
use crate::fees::TxExecutionSpeed;
use crate::hooks::{PostCondition, PreCondition, SigData, TxInUpdate};

/// How many times one submission attempt polls its post-condition
pub const POLL_ATTEMPTS: u32 = 60;

/// Delay between post-condition polls
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// A key holder bound to an indexer client
///
/// The account signs with an in-process secp256k1 key; callers that keep
/// keys elsewhere use the two-phase builder instead.
pub struct Account<C: Client> {
    secret_key: SecretKey,
    secp: Secp256k1<All>,
    client: C,
}

struct AddOutput {
    value: i64,
    script_pubkey: Vec<u8>,
}

#[async_trait]
impl PreCondition for AddOutput {
    async fn check(&self, tx: &mut ZecTx) -> bool {
        tx.add_output(self.value, self.script_pubkey.clone());
        true
    }
}

impl<C: Client> Account<C> {
    pub fn new(client: C, secret_key: SecretKey) -> Self {
        Self { secret_key, secp: Secp256k1::new(), client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(&self.secp, &self.secret_key)
    }

    /// Public key serialized under the network policy
    pub fn serialized_public_key(&self) -> Result<Vec<u8>, AccountError> {
        Ok(self.client.serialize_public_key(&self.public_key())?)
    }

    /// The account's own P2PKH address
    pub fn address(&self) -> Result<Address, AccountError> {
        let serialized = self.serialized_public_key()?;
        Ok(self.client.public_key_to_address(&serialized))
    }

    /// Spendable balance of an arbitrary address
    pub async fn balance(
        &self,
        address: &str,
        confirmations: u64,
    ) -> Result<i64, AccountError> {
        Ok(self.client.balance(address, confirmations).await?)
    }

    /// Transfer `value` zatoshi to `to`; with `send_all` the whole balance
    /// is moved and `value` is ignored
    pub async fn transfer(
        &self,
        to: &str,
        value: i64,
        speed: TxExecutionSpeed,
        send_all: bool,
        cancel: &Cancel,
    ) -> Result<(String, i64), AccountError> {
        let value = if send_all {
            self.client
                .balance(&self.address()?.encode(), 0)
                .await?
        } else {
            value
        };

        let to_addr = self.client.validate_address(to)?;
        let pay = AddOutput { value, script_pubkey: to_addr.script_pubkey() };

        self.send_transaction(None, speed, None, Some(&pay), None, None, send_all, cancel)
            .await
    }

    /// Build, sign, publish and confirm a transaction
    ///
    /// Without a contract the transaction is funded from the account's own
    /// address; with one, from the contract's P2SH address, using the
    /// contract as the signing subscript and pushing it onto every
    /// signature script. `pre_cond` runs first and typically declares the
    /// outputs; returning `false` aborts. After publishing, `post_cond` is
    /// polled until it holds; an exhausted window re-submits, since the
    /// network only promises at-least-once visibility. Returns the display
    /// transaction hash and the fee paid.
    #[allow(clippy::too_many_arguments)]
    pub async fn send_transaction(
        &self,
        contract: Option<&[u8]>,
        speed: TxExecutionSpeed,
        update_txin: Option<&dyn TxInUpdate>,
        pre_cond: Option<&dyn PreCondition>,
        sig_data: Option<&dyn SigData>,
        post_cond: Option<&dyn PostCondition>,
        send_all: bool,
        cancel: &Cancel,
    ) -> Result<(String, i64), AccountError> {
        let mut tx = ZecTx::sapling();

        if let Some(pre) = pre_cond {
            if !pre.check(&mut tx).await {
                return Err(AccountError::PreConditionFailed);
            }
        }

        let network = self.client.network();
        let source = match contract {
            None => self.address()?,
            Some(contract) => Address::script_hash(hash160(contract), network),
        };
        let source_str = source.encode();

        log::info!("funding {} at the {:?} fee tier", source_str, speed);
        let (receive_values, source_script_pubkey) = if send_all {
            self.fund_all(&mut tx, &source_str).await?
        } else {
            self.fund(&mut tx, &source).await?
        };
        log::info!("successfully funded the transaction");

        let fee = TX_FEE;
        let last = tx
            .vout
            .last_mut()
            .ok_or(BuilderError::AmountTooSmall)?;
        last.value -= fee;

        log::info!("signing the tx");
        let subscript = match contract {
            Some(contract) => contract,
            None => source_script_pubkey.as_slice(),
        };
        self.sign(&mut tx, subscript, &receive_values, update_txin, sig_data, contract)?;
        log::info!("successfully signed the tx");

        let signed = tx.to_bytes()?;
        let tx_hash = tx.txid_hex()?;

        let mut published = false;
        loop {
            if cancel.is_cancelled() {
                return Err(if published {
                    AccountError::PostConditionFailed
                } else {
                    AccountError::Cancelled
                });
            }

            log::info!("trying to submit the tx");
            self.client.publish_transaction(&signed).await?;
            published = true;

            for _ in 0 .. POLL_ATTEMPTS {
                let confirmed = match post_cond {
                    None => true,
                    Some(cond) => cond.check(&tx).await,
                };
                if confirmed {
                    log::info!("successfully submitted the tx {}", tx_hash);
                    return Ok((tx_hash, fee));
                }
                if cancel.is_cancelled() {
                    return Err(AccountError::PostConditionFailed);
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }
    }

    /// Select inputs covering the declared outputs plus the fee, paying
    /// the surplus back to `source` as the last output
    async fn fund(
        &self,
        tx: &mut ZecTx,
        source: &Address,
    ) -> Result<(Vec<i64>, Vec<u8>), AccountError> {
        let source_str = source.encode();
        let declared: i64 = tx.vout.iter().map(|txout| txout.value).sum();

        let balance = self.client.balance(&source_str, 0).await?;
        if declared + TX_FEE > balance {
            return Err(BuilderError::InsufficientBalance {
                address: source_str,
                required: declared + TX_FEE,
                current: balance,
            }
            .into());
        }

        let utxos = self
            .client
            .get_utxos(&source_str, UTXO_LIMIT, 0)
            .await?;
        let plan = FundingPlan::cover(&tx.vout, &utxos, TX_FEE)?;

        let mut receive_values = Vec::with_capacity(plan.inputs.len());
        for (outpoint, amount) in &plan.inputs {
            tx.add_input(*outpoint);
            receive_values.push(*amount);
        }

        // surplus over the declared outputs; the fee comes out of it later
        tx.add_output(plan.total_in - declared, source.script_pubkey());

        Ok((receive_values, plan.script_pubkey))
    }

    /// Select every input the source address holds; the caller declares
    /// the single output receiving the drained value
    async fn fund_all(
        &self,
        tx: &mut ZecTx,
        source: &str,
    ) -> Result<(Vec<i64>, Vec<u8>), AccountError> {
        let utxos = self
            .client
            .get_utxos(source, UTXO_LIMIT, 0)
            .await?;
        let plan = FundingPlan::all(&utxos)?;

        let mut receive_values = Vec::with_capacity(plan.inputs.len());
        for (outpoint, amount) in &plan.inputs {
            tx.add_input(*outpoint);
            receive_values.push(*amount);
        }
        Ok((receive_values, plan.script_pubkey))
    }

    fn sign(
        &self,
        tx: &mut ZecTx,
        subscript: &[u8],
        receive_values: &[i64],
        update_txin: Option<&dyn TxInUpdate>,
        sig_data: Option<&dyn SigData>,
        contract: Option<&[u8]>,
    ) -> Result<(), AccountError> {
        let serialized_key = self.serialized_public_key()?;

        // input updates must land before the cache snapshots the inputs
        if let Some(update) = update_txin {
            for txin in tx.vin.iter_mut() {
                update.update(txin);
            }
        }

        let cache = SigHashCache::new(tx)?;
        for i in 0 .. tx.vin.len() {
            let digest = signature_hash(
                tx,
                &cache,
                i as u32,
                subscript,
                receive_values[i],
                SIGHASH_ALL,
            )?;
            let signature = self
                .secp
                .sign_ecdsa(&Message::from_digest(digest), &self.secret_key);

            let mut der = signature.serialize_der().to_vec();
            der.push(SIGHASH_ALL);

            let mut builder = ScriptBuilder::new();
            builder.push_data(&der).push_data(&serialized_key);
            if let Some(extra) = sig_data {
                extra.extend(&mut builder);
            }
            if let Some(contract) = contract {
                builder.push_data(contract);
            }
            tx.vin[i].script_sig = builder.script();
        }
        Ok(())
    }
}
