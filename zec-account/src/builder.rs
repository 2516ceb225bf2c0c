//! Pull-funding convenience over the two-phase builder
//!
//! [`zec_tx_builder::Builder`] expects the caller to supply the UTXO sets;
//! this wrapper fetches them from the client first and adds submission,
//! keeping the detached-signing surface otherwise identical.

use zec_tx_builder::config::UTXO_LIMIT;
use zec_tx_builder::secp256k1::{ecdsa::Signature, PublicKey};
use zec_tx_builder::contract_address;

use crate::client::Client;
use crate::errors::AccountError;

/// Builds transactions, fetching the funding UTXOs itself
pub struct TxBuilder<C: Client> {
    client: C,
}

impl<C: Client> TxBuilder<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch funding for the key holder's address (and the contract's, if
    /// any) and assemble an unsigned transaction sending `value` to `to`
    pub async fn build(
        &self,
        public_key: &PublicKey,
        to: &str,
        contract: Option<&[u8]>,
        value: i64,
        master_inputs: u64,
        contract_inputs: u64,
    ) -> Result<Tx<'_, C>, AccountError> {
        let network = self.client.network();

        let serialized_key = self.client.serialize_public_key(public_key)?;
        let from = self.client.public_key_to_address(&serialized_key);

        let master_limit = if master_inputs == 0 { UTXO_LIMIT } else { master_inputs };
        let master_utxos = self
            .client
            .get_utxos(&from.encode(), master_limit, 0)
            .await?;

        let contract_utxos = match contract {
            Some(contract) => {
                let limit = if contract_inputs == 0 { UTXO_LIMIT } else { contract_inputs };
                self.client
                    .get_utxos(&contract_address(contract, network).encode(), limit, 0)
                    .await?
            }
            None => Vec::new(),
        };

        let inner = zec_tx_builder::Builder::new(network).build(
            public_key,
            to,
            contract,
            value,
            &master_utxos,
            &contract_utxos,
        )?;

        Ok(Tx { inner, client: &self.client })
    }
}

/// An assembled transaction bound to the client that will publish it
pub struct Tx<'a, C: Client> {
    inner: zec_tx_builder::Tx,
    client: &'a C,
}

impl<C: Client> Tx<'_, C> {
    /// Per-input signature hashes, in input order
    pub fn digests(&self) -> &[[u8; 32]] {
        self.inner.digests()
    }

    /// Install the detached signatures, one per input
    pub fn inject_signatures(&mut self, signatures: &[Signature]) -> Result<(), AccountError> {
        Ok(self.inner.inject_signatures(signatures)?)
    }

    /// Publish the signed transaction, returning its hash in display byte
    /// order
    pub async fn submit(&self) -> Result<Vec<u8>, AccountError> {
        let signed = self.inner.signed_bytes()?;
        self.client.publish_transaction(&signed).await?;
        let tx_hash =
            hex::decode(self.inner.txid_hex()?).map_err(|_| zec_tx_builder::Error::Encoding)?;
        Ok(tx_hash)
    }
}
