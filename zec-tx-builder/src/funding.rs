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
//! Input selection for funding a transaction
//!
//! All inputs of one selection must spend the same script public key: the
//! signer uses a single subscript per input group, so mixing scripts inside
//! a group would produce unverifiable signatures. The first candidate fixes
//! the canonical script and every non-matching candidate is skipped.

use crate::config::DUST_THRESHOLD;
use crate::data::Utxo;
use crate::errors::Error;
use crate::transaction::{OutPoint, TxOut};

/// A set of selected inputs covering some target value
#[derive(Clone, Debug, Default)]
pub struct FundingPlan {
    /// Selected outpoints with the value each one contributes
    pub inputs: Vec<(OutPoint, i64)>,
    /// Script public key shared by every selected input
    pub script_pubkey: Vec<u8>,
    /// Sum of the selected values
    pub total_in: i64,
}

impl FundingPlan {
    /// Select inputs until the declared outputs plus `fee` are covered
    ///
    /// Candidates are consumed in the order supplied. Outputs below the
    /// dust threshold are rejected up front; running out of matching
    /// candidates before the target is covered fails the plan.
    pub fn cover(outputs: &[TxOut], utxos: &[Utxo], fee: i64) -> Result<Self, Error> {
        let mut target = 0i64;
        for (index, txout) in outputs.iter().enumerate() {
            if txout.value < DUST_THRESHOLD {
                return Err(Error::DustOutput { index, value: txout.value });
            }
            target += txout.value;
        }

        let mut plan = Self::default();
        for utxo in utxos {
            if !plan.try_select(utxo)? {
                continue;
            }
            if plan.total_in >= target + fee {
                break;
            }
        }

        if plan.total_in < target + fee {
            return Err(Error::MismatchedPubKeys);
        }
        Ok(plan)
    }

    /// Select every candidate matching the canonical script, draining the
    /// address
    pub fn all(utxos: &[Utxo]) -> Result<Self, Error> {
        let mut plan = Self::default();
        for utxo in utxos {
            plan.try_select(utxo)?;
        }
        Ok(plan)
    }

    fn try_select(&mut self, utxo: &Utxo) -> Result<bool, Error> {
        let script_pubkey = utxo.script_pubkey_bytes()?;
        if self.script_pubkey.is_empty() {
            self.script_pubkey = script_pubkey;
        } else if self.script_pubkey != script_pubkey {
            return Ok(false);
        }
        self.inputs.push((utxo.outpoint()?, utxo.amount));
        self.total_in += utxo.amount;
        Ok(true)
    }
}

/// Change left over after paying `target` and `fee` out of `total_in`, if
/// it is worth an output at all; smaller remainders are forfeited to the fee
pub fn change_value(total_in: i64, target: i64, fee: i64) -> Option<i64> {
    let remainder = total_in - target;
    if remainder > fee + DUST_THRESHOLD {
        Some(remainder - fee)
    } else {
        None
    }
}
