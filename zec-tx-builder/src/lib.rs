//! Construction, encoding and signature hashing of ZCash transparent
//! transactions
//!
//! The crate covers the offline half of a wallet: picking UTXOs to fund a
//! payment, serializing Overwinter/Sapling transactions, computing the
//! per-input ZIP-243 digests and assembling signature scripts from detached
//! ECDSA signatures. Talking to the chain (UTXO listing, publishing,
//! confirmation tracking) lives in the companion `zec-account` crate.

pub mod address;
pub mod builder;
pub mod config;
pub mod data;
pub mod errors;
pub mod funding;
pub mod script;
pub mod sighash;
pub mod transaction;

// Re-exported so that signer code agrees with this crate on key and
// signature types
pub use secp256k1;

pub use crate::address::{
    public_key_to_address, serialize_public_key, Address, AddressKind, Network,
};
pub use crate::builder::{contract_address, Builder, Tx};
pub use crate::data::Utxo;
pub use crate::errors::Error;
pub use crate::funding::FundingPlan;
pub use crate::script::ScriptBuilder;
pub use crate::sighash::{signature_hash, SigHashCache};
pub use crate::transaction::{OutPoint, TxIn, TxOut, TxVersion, ZecTx};
