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

/// Errors surfaced while talking to the indexer or the fee oracle
#[derive(ThisError, Debug)]
pub enum ClientError {
    /// Transport level failure
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status code
    #[error("request failed with ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded
    #[error("cannot decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The speed tier has no fee associated with it
    #[error("invalid speed tier")]
    InvalidSpeedTier,
}

/// Errors returned by account operations
#[derive(ThisError, Debug)]
pub enum AccountError {
    #[error(transparent)]
    Builder(#[from] zec_tx_builder::Error),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// The pre-condition for executing a transaction failed
    #[error("pre-condition check failed")]
    PreConditionFailed,

    /// The post-condition for executing a transaction failed
    #[error("post-condition check failed")]
    PostConditionFailed,

    /// The operation was cancelled before the transaction was published
    #[error("cancelled")]
    Cancelled,
}
