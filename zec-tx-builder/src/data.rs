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
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::transaction::OutPoint;

/// An unspent transparent output as reported by the indexer
///
/// Hashes and scripts are kept hex encoded, in the indexer's own wire shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    /// Transaction hash in display order
    pub tx_hash: String,
    /// Value in zatoshi
    pub amount: i64,
    /// Hex encoded script public key
    pub script_pubkey: String,
    /// Output index within the transaction
    pub vout: u32,
}

impl Utxo {
    pub fn script_pubkey_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(hex::decode(&self.script_pubkey)?)
    }

    pub fn outpoint(&self) -> Result<OutPoint, Error> {
        OutPoint::from_display_hex(&self.tx_hash, self.vout)
    }
}
