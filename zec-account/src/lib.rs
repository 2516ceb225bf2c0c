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
//! ZCash accounts over an external chain indexer
//!
//! An [`Account`] pairs a secp256k1 key with a [`Client`] and drives the
//! whole transaction lifecycle: pre-condition, funding, signing,
//! publishing and post-condition polling. The same engine serves plain
//! transfers, hash-locked contract deposits and redemptions, and
//! slave-address sweeps; the differences are expressed through the hook
//! traits in [`hooks`].

pub mod account;
pub mod builder;
pub mod cancel;
pub mod client;
pub mod errors;
pub mod fees;
pub mod hooks;
pub mod mercury;

pub use zec_tx_builder;

pub use crate::account::{Account, POLL_ATTEMPTS, POLL_INTERVAL};
pub use crate::builder::TxBuilder;
pub use crate::cancel::Cancel;
pub use crate::client::{Client, ClientCore};
pub use crate::errors::{AccountError, ClientError};
pub use crate::fees::{suggested_tx_rate, TxExecutionSpeed};
pub use crate::hooks::{PostCondition, PreCondition, SigData, TxInUpdate};
pub use crate::mercury::MercuryClient;
