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
use thiserror::Error as ThisError;

/// All the possible errors returned while building a transaction
#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum Error {
    /// The network name is not one of mainnet, testnet3 or regtest,
    /// or the requested operation is not defined for it
    #[error("unsupported network {0}")]
    UnsupportedNetwork(String),

    /// The address could not be decoded, or its prefix does not belong
    /// to the expected network
    #[error("invalid address")]
    InvalidAddress,

    /// The address does not hold enough funds to cover the requested
    /// value plus the transaction fee
    #[error("insufficient balance in {address} required:{required} current:{current}")]
    InsufficientBalance {
        address: String,
        required: i64,
        current: i64,
    },

    /// An output value is below the relay dust threshold
    #[error("output {index} value ({value}) is less than the minimum value")]
    DustOutput { index: usize, value: i64 },

    /// The candidate UTXO set does not contain enough outputs paying the
    /// same script public key to fund the transaction
    #[error("failed to fund the transaction mismatched script public keys")]
    MismatchedPubKeys,

    /// The amount to send does not cover the fee plus the dust threshold
    #[error("amount is too small")]
    AmountTooSmall,

    /// The number of signatures does not match the number of inputs
    #[error("expected {expected} signatures, got {got}")]
    SigCountMismatch { expected: usize, got: usize },

    /// The input index does not exist in the transaction
    #[error("signature hash error: input {index} but {inputs} inputs")]
    BadIndex { index: u32, inputs: usize },

    /// Error writing data into a hash preimage
    #[error("failed to compute hash")]
    HashError,

    /// Error serializing the transaction or decoding hex fields
    #[error("encoding error")]
    Encoding,

    /// Attempted to serialize a transaction before injecting signatures
    #[error("transaction has no signatures")]
    Unsigned,
}

impl From<hex::FromHexError> for Error {
    fn from(_: hex::FromHexError) -> Error {
        Error::Encoding
    }
}
