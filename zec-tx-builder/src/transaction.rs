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
//! Transparent transaction structure and wire encoding
//!
//! Only Overwinter (v3) and Sapling (v4) transactions are constructed, and
//! the shielded sections are always empty: the Sapling value balance is zero
//! and the shielded spend, shielded output and joinsplit vectors are
//! serialized with zero length.

use std::io::{self, Write};

use byteorder::{LittleEndian, WriteBytesExt};
use sha2::{Digest, Sha256};

use crate::config::{MAX_SEQUENCE, TX_EXPIRY_HEIGHT};
use crate::errors::Error;

pub const OVERWINTER_VERSION_GROUP_ID: u32 = 0x03C4_8270;
pub const SAPLING_VERSION_GROUP_ID: u32 = 0x892F_2085;

pub const OVERWINTER_TX_VERSION: u32 = 3;
pub const SAPLING_TX_VERSION: u32 = 4;

/// Bit 31 of the version field, set on every Overwinter-era transaction
const OVERWINTERED_FLAG: u32 = 1 << 31;

/// Transaction versions this library can produce
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxVersion {
    Overwinter,
    Sapling,
}

impl TxVersion {
    pub fn number(&self) -> u32 {
        match self {
            TxVersion::Overwinter => OVERWINTER_TX_VERSION,
            TxVersion::Sapling => SAPLING_TX_VERSION,
        }
    }

    /// Version field as it appears on the wire, with the overwintered flag
    pub fn header(&self) -> u32 {
        self.number() | OVERWINTERED_FLAG
    }

    pub fn version_group_id(&self) -> u32 {
        match self {
            TxVersion::Overwinter => OVERWINTER_VERSION_GROUP_ID,
            TxVersion::Sapling => SAPLING_VERSION_GROUP_ID,
        }
    }
}

/// Reference to an output of a previous transaction
///
/// The hash is kept in internal byte order, i.e. reversed with respect to
/// the hex form shown by explorers and indexers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub hash: [u8; 32],
    pub index: u32,
}

impl OutPoint {
    pub fn new(hash: [u8; 32], index: u32) -> Self {
        Self { hash, index }
    }

    /// Parse a display-order hex transaction hash
    pub fn from_display_hex(tx_hash: &str, index: u32) -> Result<Self, Error> {
        let bytes = hex::decode(tx_hash)?;
        let mut hash: [u8; 32] = bytes.try_into().map_err(|_| Error::Encoding)?;
        hash.reverse();
        Ok(Self { hash, index })
    }

    pub fn display_hex(&self) -> String {
        let mut bytes = self.hash;
        bytes.reverse();
        hex::encode(bytes)
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.hash)?;
        w.write_u32::<LittleEndian>(self.index)
    }
}

/// A transparent transaction input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxIn {
    pub prevout: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl TxIn {
    pub fn new(prevout: OutPoint) -> Self {
        Self { prevout, script_sig: Vec::new(), sequence: MAX_SEQUENCE }
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        self.prevout.write(w)?;
        write_var_bytes(w, &self.script_sig)?;
        w.write_u32::<LittleEndian>(self.sequence)
    }
}

/// A transparent transaction output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    pub value: i64,
    pub script_pubkey: Vec<u8>,
}

impl TxOut {
    pub fn new(value: i64, script_pubkey: Vec<u8>) -> Self {
        Self { value, script_pubkey }
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_i64::<LittleEndian>(self.value)?;
        write_var_bytes(w, &self.script_pubkey)
    }
}

/// An Overwinter or Sapling transaction with empty shielded sections
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZecTx {
    pub version: TxVersion,
    pub vin: Vec<TxIn>,
    pub vout: Vec<TxOut>,
    pub lock_time: u32,
    pub expiry_height: u32,
}

impl ZecTx {
    pub fn new(version: TxVersion) -> Self {
        Self {
            version,
            vin: Vec::new(),
            vout: Vec::new(),
            lock_time: 0,
            expiry_height: TX_EXPIRY_HEIGHT,
        }
    }

    pub fn sapling() -> Self {
        Self::new(TxVersion::Sapling)
    }

    pub fn add_input(&mut self, prevout: OutPoint) {
        self.vin.push(TxIn::new(prevout));
    }

    pub fn add_output(&mut self, value: i64, script_pubkey: Vec<u8>) {
        self.vout.push(TxOut::new(value, script_pubkey));
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<LittleEndian>(self.version.header())?;
        w.write_u32::<LittleEndian>(self.version.version_group_id())?;

        write_compact_size(w, self.vin.len() as u64)?;
        for txin in &self.vin {
            txin.write(w)?;
        }

        write_compact_size(w, self.vout.len() as u64)?;
        for txout in &self.vout {
            txout.write(w)?;
        }

        w.write_u32::<LittleEndian>(self.lock_time)?;
        w.write_u32::<LittleEndian>(self.expiry_height)?;

        match self.version {
            TxVersion::Sapling => {
                // valueBalance, then empty shielded spends, outputs and
                // joinsplits
                w.write_i64::<LittleEndian>(0)?;
                write_compact_size(w, 0)?;
                write_compact_size(w, 0)?;
                write_compact_size(w, 0)?;
            }
            TxVersion::Overwinter => {
                // empty joinsplits only
                write_compact_size(w, 0)?;
            }
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut bytes = Vec::with_capacity(self.serialized_size_hint());
        self.write(&mut bytes).map_err(|_| Error::Encoding)?;
        Ok(bytes)
    }

    /// Double-SHA256 of the serialized transaction, in internal byte order
    pub fn txid(&self) -> Result<[u8; 32], Error> {
        let bytes = self.to_bytes()?;
        let digest = Sha256::digest(Sha256::digest(bytes));
        let mut txid = [0u8; 32];
        txid.copy_from_slice(&digest);
        Ok(txid)
    }

    /// Transaction hash in the display order used by explorers and indexers
    pub fn txid_hex(&self) -> Result<String, Error> {
        let mut txid = self.txid()?;
        txid.reverse();
        Ok(hex::encode(txid))
    }

    fn serialized_size_hint(&self) -> usize {
        let vin: usize = self
            .vin
            .iter()
            .map(|i| 40 + 9 + i.script_sig.len())
            .sum();
        let vout: usize = self
            .vout
            .iter()
            .map(|o| 8 + 9 + o.script_pubkey.len())
            .sum();
        8 + 9 + vin + 9 + vout + 16 + 12
    }
}

pub(crate) fn write_compact_size<W: Write>(w: &mut W, n: u64) -> io::Result<()> {
    match n {
        0 ..= 0xFC => w.write_u8(n as u8),
        0xFD ..= 0xFFFF => {
            w.write_u8(0xFD)?;
            w.write_u16::<LittleEndian>(n as u16)
        }
        0x1_0000 ..= 0xFFFF_FFFF => {
            w.write_u8(0xFE)?;
            w.write_u32::<LittleEndian>(n as u32)
        }
        _ => {
            w.write_u8(0xFF)?;
            w.write_u64::<LittleEndian>(n)
        }
    }
}

pub(crate) fn write_var_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> io::Result<()> {
    write_compact_size(w, bytes.len() as u64)?;
    w.write_all(bytes)
}
