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
//! The indexer interface and the wallet facade on top of it

use async_trait::async_trait;

use zec_tx_builder::config::UTXO_LIMIT;
use zec_tx_builder::script::{hash160, slave_script};
use zec_tx_builder::secp256k1::PublicKey;
use zec_tx_builder::{Address, Error as BuilderError, Network, Utxo};

use crate::errors::ClientError;

/// The indexer surface the transaction engine consumes
///
/// Implementations wrap whatever backend tracks the chain: a block
/// explorer API, a full node, or an in-memory double for tests.
#[async_trait]
pub trait ClientCore: Send + Sync {
    /// Network the backend is following
    fn network(&self) -> Network;

    /// Unspent outputs of `address`, oldest first, with at least
    /// `confirmations` confirmations
    async fn get_utxos(
        &self,
        address: &str,
        limit: u64,
        confirmations: u64,
    ) -> Result<Vec<Utxo>, ClientError>;

    /// Confirmation count of a transaction
    async fn confirmations(&self, tx_hash: &str) -> Result<u64, ClientError>;

    /// Whether `address` has received at least `value`, and how much it
    /// actually received
    async fn script_funded(&self, address: &str, value: i64)
        -> Result<(bool, i64), ClientError>;

    /// Whether at least `value` was spent out of `address`, and how much
    /// remains there
    async fn script_redeemed(
        &self,
        address: &str,
        value: i64,
    ) -> Result<(bool, i64), ClientError>;

    /// Whether `spender` spent from `address`, and the hex signature
    /// script of the spending input
    async fn script_spent(
        &self,
        address: &str,
        spender: &str,
    ) -> Result<(bool, String), ClientError>;

    /// Publish a fully signed transaction
    async fn publish_transaction(&self, signed_tx: &[u8]) -> Result<(), ClientError>;
}

/// Wallet-level conveniences derived from [`ClientCore`]
///
/// Everything here is a default method, so any indexer implementation gets
/// the full facade for free.
#[async_trait]
pub trait Client: ClientCore {
    /// Spendable balance of `address`, as the sum of its UTXOs
    async fn balance(&self, address: &str, confirmations: u64) -> Result<i64, ClientError> {
        let utxos = self
            .get_utxos(address, UTXO_LIMIT, confirmations)
            .await?;
        Ok(utxos.iter().map(|utxo| utxo.amount).sum())
    }

    /// Serialize a public key following this network's policy
    fn serialize_public_key(&self, public_key: &PublicKey) -> Result<Vec<u8>, BuilderError> {
        zec_tx_builder::serialize_public_key(public_key, self.network())
    }

    /// P2PKH address of an already serialized public key
    fn public_key_to_address(&self, public_key: &[u8]) -> Address {
        zec_tx_builder::public_key_to_address(public_key, self.network())
    }

    /// Nonce-scoped single-spender script for the given master key hash
    fn slave_script(&self, master_pubkey_hash: &[u8; 20], nonce: &[u8]) -> Vec<u8> {
        slave_script(master_pubkey_hash, nonce)
    }

    /// P2SH address of the nonce-scoped script
    fn slave_address(&self, master_pubkey_hash: &[u8; 20], nonce: &[u8]) -> Address {
        let script = slave_script(master_pubkey_hash, nonce);
        Address::script_hash(hash160(&script), self.network())
    }

    /// Decode `address` and confirm it belongs to this network
    fn validate_address(&self, address: &str) -> Result<Address, BuilderError> {
        Address::decode(address, self.network())
    }

    /// Append an explorer link for the transaction to `msg`
    fn format_transaction_view(&self, msg: &str, tx_hash: &str) -> String {
        match self.network() {
            Network::Mainnet => format!(
                "{}, transaction can be viewed at https://zcashblockexplorer.com/transactions/{}",
                msg, tx_hash
            ),
            Network::Testnet => format!(
                "{}, transaction can be viewed at https://testnet.zcashexplorer.app/transactions/{}",
                msg, tx_hash
            ),
            Network::Regtest => String::new(),
        }
    }
}

impl<T: ClientCore + ?Sized> Client for T {}
