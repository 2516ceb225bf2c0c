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
//! Script construction utilities
//!
//! Only the small opcode subset needed for P2PKH/P2SH templates, redeem
//! scripts and signature scripts is defined here.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::address::AddressKind;
use crate::errors::Error;

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4C;
pub const OP_PUSHDATA2: u8 = 0x4D;
pub const OP_PUSHDATA4: u8 = 0x4E;
pub const OP_1NEGATE: u8 = 0x4F;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_DROP: u8 = 0x75;
pub const OP_DUP: u8 = 0x76;
pub const OP_SIZE: u8 = 0x82;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_SHA256: u8 = 0xA8;
pub const OP_HASH160: u8 = 0xA9;
pub const OP_CHECKSIG: u8 = 0xAC;

/// Incremental script writer with canonical data pushes
#[derive(Clone, Debug, Default)]
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Append a raw opcode
    pub fn push_op(&mut self, op: u8) -> &mut Self {
        self.script.push(op);
        self
    }

    /// Append `data` using the smallest canonical push encoding
    pub fn push_data(&mut self, data: &[u8]) -> &mut Self {
        match data {
            [] | [0x00] => {
                self.script.push(OP_0);
            }
            [n @ 1 ..= 16] => {
                self.script.push(OP_1 + *n - 1);
            }
            [0x81] => {
                self.script.push(OP_1NEGATE);
            }
            _ if data.len() <= 75 => {
                self.script.push(data.len() as u8);
                self.script.extend_from_slice(data);
            }
            _ if data.len() <= 0xFF => {
                self.script.push(OP_PUSHDATA1);
                self.script.push(data.len() as u8);
                self.script.extend_from_slice(data);
            }
            _ if data.len() <= 0xFFFF => {
                self.script.push(OP_PUSHDATA2);
                self.script
                    .extend_from_slice(&(data.len() as u16).to_le_bytes());
                self.script.extend_from_slice(data);
            }
            _ => {
                self.script.push(OP_PUSHDATA4);
                self.script
                    .extend_from_slice(&(data.len() as u32).to_le_bytes());
                self.script.extend_from_slice(data);
            }
        }
        self
    }

    pub fn script(self) -> Vec<u8> {
        self.script
    }
}

/// HASH160: RIPEMD-160 of SHA-256
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(data);
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&Ripemd160::digest(sha));
    hash
}

/// `OP_DUP OP_HASH160 <hash> OP_EQUALVERIFY OP_CHECKSIG`
pub fn pay_to_pubkey_hash(hash: &[u8; 20]) -> Vec<u8> {
    let mut builder = ScriptBuilder::new();
    builder
        .push_op(OP_DUP)
        .push_op(OP_HASH160)
        .push_data(hash)
        .push_op(OP_EQUALVERIFY)
        .push_op(OP_CHECKSIG);
    builder.script()
}

/// `OP_HASH160 <hash> OP_EQUAL`
pub fn pay_to_script_hash(hash: &[u8; 20]) -> Vec<u8> {
    let mut builder = ScriptBuilder::new();
    builder
        .push_op(OP_HASH160)
        .push_data(hash)
        .push_op(OP_EQUAL);
    builder.script()
}

/// Nonce-scoped single-spender script
///
/// `<nonce> OP_DROP OP_DUP OP_HASH160 <master pubkey hash> OP_EQUALVERIFY
/// OP_CHECKSIG` -- the nonce only changes the script hash, so each nonce
/// yields a distinct deposit address that only the master key can sweep.
pub fn slave_script(master_pubkey_hash: &[u8; 20], nonce: &[u8]) -> Vec<u8> {
    let mut builder = ScriptBuilder::new();
    builder
        .push_data(nonce)
        .push_op(OP_DROP)
        .push_op(OP_DUP)
        .push_op(OP_HASH160)
        .push_data(master_pubkey_hash)
        .push_op(OP_EQUALVERIFY)
        .push_op(OP_CHECKSIG);
    builder.script()
}

/// Recognize the P2PKH and P2SH templates, returning the embedded HASH160
pub(crate) fn extract_script_hash(script: &[u8]) -> Option<([u8; 20], AddressKind)> {
    let mut hash = [0u8; 20];
    match script {
        [OP_DUP, OP_HASH160, 0x14, h @ .., OP_EQUALVERIFY, OP_CHECKSIG] if h.len() == 20 => {
            hash.copy_from_slice(h);
            Some((hash, AddressKind::PubKeyHash))
        }
        [OP_HASH160, 0x14, h @ .., OP_EQUAL] if h.len() == 20 => {
            hash.copy_from_slice(h);
            Some((hash, AddressKind::ScriptHash))
        }
        _ => None,
    }
}

/// Extract every data push from a script, in order
///
/// Used to inspect signature scripts, e.g. to recover the secret revealed
/// when a hash-locked contract is redeemed. Non-push opcodes are skipped.
pub fn pushed_data(script: &[u8]) -> Result<Vec<Vec<u8>>, Error> {
    let mut pushes = Vec::new();
    let mut i = 0;
    while i < script.len() {
        let op = script[i];
        i += 1;
        match op {
            OP_0 => pushes.push(Vec::new()),
            OP_1NEGATE => pushes.push(vec![0x81]),
            n @ 1 ..= 75 => {
                let n = n as usize;
                let data = script.get(i .. i + n).ok_or(Error::Encoding)?;
                pushes.push(data.to_vec());
                i += n;
            }
            OP_PUSHDATA1 => {
                let n = *script.get(i).ok_or(Error::Encoding)? as usize;
                i += 1;
                let data = script.get(i .. i + n).ok_or(Error::Encoding)?;
                pushes.push(data.to_vec());
                i += n;
            }
            OP_PUSHDATA2 => {
                let bytes = script.get(i .. i + 2).ok_or(Error::Encoding)?;
                let n = u16::from_le_bytes([bytes[0], bytes[1]]) as usize;
                i += 2;
                let data = script.get(i .. i + n).ok_or(Error::Encoding)?;
                pushes.push(data.to_vec());
                i += n;
            }
            OP_PUSHDATA4 => {
                let bytes = script.get(i .. i + 4).ok_or(Error::Encoding)?;
                let n = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
                i += 4;
                let data = script.get(i .. i + n).ok_or(Error::Encoding)?;
                pushes.push(data.to_vec());
                i += n;
            }
            op @ OP_1 ..= OP_16 => pushes.push(vec![op - OP_1 + 1]),
            _ => {}
        }
    }
    Ok(pushes)
}
