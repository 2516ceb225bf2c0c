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
//! ZIP-243 signature hashes for Overwinter and Sapling transactions
//!
//! The digest personalization commits to the consensus branch id selected
//! by the transaction expiry height, so signatures are invalidated across
//! network upgrades.

use blake2b_simd::Params as Blake2bParams;
use byteorder::{LittleEndian, WriteBytesExt};

use crate::errors::Error;
use crate::transaction::{write_var_bytes, TxVersion, ZecTx};

pub const SIGHASH_ALL: u8 = 0x01;
pub const SIGHASH_NONE: u8 = 0x02;
pub const SIGHASH_SINGLE: u8 = 0x03;
pub const SIGHASH_MASK: u8 = 0x1F;
pub const SIGHASH_ANYONECANPAY: u8 = 0x80;

/// Index value signalling the no-input form of the preimage
pub const NO_INPUT: u32 = u32::MAX;

const ZCASH_SIGHASH_PERSONALIZATION_PREFIX: &[u8; 12] = b"ZcashSigHash";
const ZCASH_PREVOUTS_HASH_PERSONALIZATION: &[u8; 16] = b"ZcashPrevoutHash";
const ZCASH_SEQUENCE_HASH_PERSONALIZATION: &[u8; 16] = b"ZcashSequencHash";
const ZCASH_OUTPUTS_HASH_PERSONALIZATION: &[u8; 16] = b"ZcashOutputsHash";

/// Branch ids by activation height, both in the byte order they are
/// appended to the sighash personalization
const UPGRADE_PARAMS: [(u32, [u8; 4]); 3] = [
    (0, [0x00, 0x00, 0x00, 0x00]),
    (207_500, [0x19, 0x1B, 0xA8, 0x5B]),
    (280_000, [0xBB, 0x09, 0xB8, 0x76]),
];

/// Consensus branch id active at the given height
pub fn branch_id(height: u32) -> [u8; 4] {
    let mut branch = UPGRADE_PARAMS[0].1;
    for (activation_height, id) in UPGRADE_PARAMS {
        if height >= activation_height {
            branch = id;
        }
    }
    branch
}

/// BLAKE2b personalization for signature hashes expiring at `expiry_height`
pub fn sighash_personalization(expiry_height: u32) -> [u8; 16] {
    let mut personal = [0u8; 16];
    personal[.. 12].copy_from_slice(ZCASH_SIGHASH_PERSONALIZATION_PREFIX);
    personal[12 ..].copy_from_slice(&branch_id(expiry_height));
    personal
}

fn blake2b_256(personal: &[u8; 16], data: &[u8]) -> [u8; 32] {
    let hash = Blake2bParams::new()
        .hash_length(32)
        .personal(personal)
        .hash(data);
    let mut digest = [0u8; 32];
    digest.copy_from_slice(hash.as_bytes());
    digest
}

/// Pre-computed digests over the transaction's input and output sets
///
/// Build once per finished transaction; the cache is stale as soon as the
/// transaction mutates.
#[derive(Clone, Debug)]
pub struct SigHashCache {
    pub hash_prevouts: [u8; 32],
    pub hash_sequence: [u8; 32],
    pub hash_outputs: [u8; 32],
}

impl SigHashCache {
    pub fn new(tx: &ZecTx) -> Result<Self, Error> {
        let mut prevouts = Vec::with_capacity(tx.vin.len() * 36);
        for txin in &tx.vin {
            txin.prevout
                .write(&mut prevouts)
                .map_err(|_| Error::HashError)?;
        }

        let mut sequences = Vec::with_capacity(tx.vin.len() * 4);
        for txin in &tx.vin {
            sequences
                .write_u32::<LittleEndian>(txin.sequence)
                .map_err(|_| Error::HashError)?;
        }

        let mut outputs = Vec::with_capacity(tx.vout.len() * 34);
        for txout in &tx.vout {
            txout
                .write(&mut outputs)
                .map_err(|_| Error::HashError)?;
        }

        Ok(Self {
            hash_prevouts: blake2b_256(ZCASH_PREVOUTS_HASH_PERSONALIZATION, &prevouts),
            hash_sequence: blake2b_256(ZCASH_SEQUENCE_HASH_PERSONALIZATION, &sequences),
            hash_outputs: blake2b_256(ZCASH_OUTPUTS_HASH_PERSONALIZATION, &outputs),
        })
    }
}

/// Compute the ZIP-243 signature hash for one input
///
/// `subscript` is the script public key being spent, or the redeem script
/// when the input spends a pay-to-script-hash contract. `amount` is the
/// value of the output being consumed. Passing [`NO_INPUT`] as `index`
/// omits the per-input section entirely.
pub fn signature_hash(
    tx: &ZecTx,
    cache: &SigHashCache,
    index: u32,
    subscript: &[u8],
    amount: i64,
    hash_type: u8,
) -> Result<[u8; 32], Error> {
    if index != NO_INPUT && index as usize >= tx.vin.len() {
        return Err(Error::BadIndex { index, inputs: tx.vin.len() });
    }

    let zero_hash = [0u8; 32];
    let mut preimage = Vec::with_capacity(260 + subscript.len());

    preimage
        .write_u32::<LittleEndian>(tx.version.header())
        .map_err(|_| Error::HashError)?;
    preimage
        .write_u32::<LittleEndian>(tx.version.version_group_id())
        .map_err(|_| Error::HashError)?;

    if hash_type & SIGHASH_ANYONECANPAY == 0 {
        preimage.extend_from_slice(&cache.hash_prevouts);
    } else {
        preimage.extend_from_slice(&zero_hash);
    }

    if hash_type & SIGHASH_ANYONECANPAY == 0
        && hash_type & SIGHASH_MASK != SIGHASH_SINGLE
        && hash_type & SIGHASH_MASK != SIGHASH_NONE
    {
        preimage.extend_from_slice(&cache.hash_sequence);
    } else {
        preimage.extend_from_slice(&zero_hash);
    }

    if hash_type & SIGHASH_MASK != SIGHASH_SINGLE && hash_type & SIGHASH_MASK != SIGHASH_NONE {
        preimage.extend_from_slice(&cache.hash_outputs);
    } else if hash_type & SIGHASH_MASK == SIGHASH_SINGLE && (index as usize) < tx.vout.len() {
        let mut single = Vec::with_capacity(34);
        tx.vout[index as usize]
            .write(&mut single)
            .map_err(|_| Error::HashError)?;
        preimage.extend_from_slice(&blake2b_256(ZCASH_OUTPUTS_HASH_PERSONALIZATION, &single));
    } else {
        preimage.extend_from_slice(&zero_hash);
    }

    // joinsplits are never populated
    preimage.extend_from_slice(&zero_hash);

    if tx.version == TxVersion::Sapling {
        // shielded spends and shielded outputs, also always empty
        preimage.extend_from_slice(&zero_hash);
        preimage.extend_from_slice(&zero_hash);
    }

    preimage
        .write_u32::<LittleEndian>(tx.lock_time)
        .map_err(|_| Error::HashError)?;
    preimage
        .write_u32::<LittleEndian>(tx.expiry_height)
        .map_err(|_| Error::HashError)?;

    if tx.version == TxVersion::Sapling {
        // valueBalance
        preimage
            .write_i64::<LittleEndian>(0)
            .map_err(|_| Error::HashError)?;
    }

    preimage
        .write_u32::<LittleEndian>(hash_type as u32)
        .map_err(|_| Error::HashError)?;

    if index != NO_INPUT {
        let txin = &tx.vin[index as usize];
        txin.prevout
            .write(&mut preimage)
            .map_err(|_| Error::HashError)?;
        write_var_bytes(&mut preimage, subscript).map_err(|_| Error::HashError)?;
        preimage
            .write_i64::<LittleEndian>(amount)
            .map_err(|_| Error::HashError)?;
        preimage
            .write_u32::<LittleEndian>(txin.sequence)
            .map_err(|_| Error::HashError)?;
    }

    Ok(blake2b_256(
        &sighash_personalization(tx.expiry_height),
        &preimage,
    ))
}
