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
//! Transparent address codec
//!
//! ZCash transparent addresses are Base58Check strings with a two byte
//! version prefix, selected by network and by whether the payload is a
//! public key hash or a script hash.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::errors::Error;
use crate::script;

/// Length of the Base58Check payload: 2 byte prefix + HASH160 + 4 byte checksum
const DECODED_LEN: usize = 26;

/// The ZCash network an address or client is bound to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    /// Canonical network name, as reported by the indexer
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet3",
            Network::Regtest => "regtest",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name.to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" | "testnet3" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(Error::UnsupportedNetwork(other.to_string())),
        }
    }

    /// Version prefix for pay-to-public-key-hash addresses
    pub fn pubkey_hash_prefix(&self) -> [u8; 2] {
        match self {
            Network::Mainnet => [0x1C, 0xB8],
            Network::Testnet | Network::Regtest => [0x1D, 0x25],
        }
    }

    /// Version prefix for pay-to-script-hash addresses
    pub fn script_hash_prefix(&self) -> [u8; 2] {
        match self {
            Network::Mainnet => [0x1C, 0xBD],
            Network::Testnet | Network::Regtest => [0x1C, 0xBA],
        }
    }
}

/// The two transparent address kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressKind {
    PubKeyHash,
    ScriptHash,
}

/// A decoded transparent address
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Address {
    hash: [u8; 20],
    kind: AddressKind,
    network: Network,
}

impl Address {
    pub fn new(hash: [u8; 20], network: Network, kind: AddressKind) -> Self {
        Self { hash, kind, network }
    }

    pub fn pub_key_hash(hash: [u8; 20], network: Network) -> Self {
        Self::new(hash, network, AddressKind::PubKeyHash)
    }

    pub fn script_hash(hash: [u8; 20], network: Network) -> Self {
        Self::new(hash, network, AddressKind::ScriptHash)
    }

    /// Decode a Base58Check address, verifying its checksum and that the
    /// version prefix belongs to `network`
    pub fn decode(address: &str, network: Network) -> Result<Self, Error> {
        let decoded = bs58::decode(address)
            .into_vec()
            .map_err(|_| Error::InvalidAddress)?;
        if decoded.len() != DECODED_LEN {
            return Err(Error::InvalidAddress);
        }

        let (body, checksum) = decoded.split_at(DECODED_LEN - 4);
        if address_checksum(body) != checksum {
            return Err(Error::InvalidAddress);
        }

        let kind = if body[.. 2] == network.pubkey_hash_prefix() {
            AddressKind::PubKeyHash
        } else if body[.. 2] == network.script_hash_prefix() {
            AddressKind::ScriptHash
        } else {
            return Err(Error::InvalidAddress);
        };

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&body[2 ..]);
        Ok(Self { hash, kind, network })
    }

    /// Base58Check encoding of the address
    pub fn encode(&self) -> String {
        let prefix = match self.kind {
            AddressKind::PubKeyHash => self.network.pubkey_hash_prefix(),
            AddressKind::ScriptHash => self.network.script_hash_prefix(),
        };

        let mut body = Vec::with_capacity(DECODED_LEN);
        body.extend_from_slice(&prefix);
        body.extend_from_slice(&self.hash);
        let checksum = address_checksum(&body);
        body.extend_from_slice(&checksum);
        bs58::encode(body).into_string()
    }

    pub fn hash160(&self) -> &[u8; 20] {
        &self.hash
    }

    pub fn kind(&self) -> AddressKind {
        self.kind
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// The standard script public key paying to this address
    pub fn script_pubkey(&self) -> Vec<u8> {
        match self.kind {
            AddressKind::PubKeyHash => script::pay_to_pubkey_hash(&self.hash),
            AddressKind::ScriptHash => script::pay_to_script_hash(&self.hash),
        }
    }

    /// Recognize a standard P2PKH or P2SH script public key
    pub fn from_script_pubkey(script_pubkey: &[u8], network: Network) -> Option<Self> {
        let (hash, kind) = script::extract_script_hash(script_pubkey)?;
        Some(Self::new(hash, network, kind))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn address_checksum(body: &[u8]) -> [u8; 4] {
    let digest = Sha256::digest(Sha256::digest(body));
    let mut checksum = [0u8; 4];
    checksum.copy_from_slice(&digest[.. 4]);
    checksum
}

/// Serialize a public key following the network policy: compressed on
/// mainnet, uncompressed on testnet3.
///
/// The testnet behaviour is unusual but addresses are the hash of whichever
/// form is serialized, so it is kept for compatibility with contracts
/// already deployed against it.
pub fn serialize_public_key(
    public_key: &secp256k1::PublicKey,
    network: Network,
) -> Result<Vec<u8>, Error> {
    match network {
        Network::Mainnet => Ok(public_key.serialize().to_vec()),
        Network::Testnet => Ok(public_key.serialize_uncompressed().to_vec()),
        Network::Regtest => Err(Error::UnsupportedNetwork(network.name().to_string())),
    }
}

/// Derive the P2PKH address of an already serialized public key
pub fn public_key_to_address(public_key: &[u8], network: Network) -> Address {
    Address::pub_key_hash(script::hash160(public_key), network)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: [u8; 20] = [
        0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF,
        0x00, 0x10, 0x20, 0x30, 0x40,
    ];

    #[test]
    fn round_trip_all_networks_and_kinds() {
        for network in [Network::Mainnet, Network::Testnet, Network::Regtest] {
            for kind in [AddressKind::PubKeyHash, AddressKind::ScriptHash] {
                let addr = Address::new(HASH, network, kind);
                let encoded = addr.encode();
                let decoded = Address::decode(&encoded, network).unwrap();
                assert_eq!(decoded, addr);
            }
        }
    }

    #[test]
    fn known_leading_symbols() {
        assert!(Address::pub_key_hash(HASH, Network::Mainnet)
            .encode()
            .starts_with("t1"));
        assert!(Address::script_hash(HASH, Network::Mainnet)
            .encode()
            .starts_with("t3"));
        assert!(Address::pub_key_hash(HASH, Network::Testnet)
            .encode()
            .starts_with("tm"));
        assert!(Address::script_hash(HASH, Network::Testnet)
            .encode()
            .starts_with("t2"));
    }

    #[test]
    fn tampering_is_rejected() {
        let encoded = Address::pub_key_hash(HASH, Network::Testnet).encode();

        let mut chars: Vec<char> = encoded.chars().collect();
        let tampered_char = if chars[10] == '7' { '8' } else { '7' };
        chars[10] = tampered_char;
        let tampered: String = chars.into_iter().collect();

        assert_eq!(
            Address::decode(&tampered, Network::Testnet),
            Err(Error::InvalidAddress)
        );
    }

    #[test]
    fn wrong_network_prefix_is_rejected() {
        let encoded = Address::pub_key_hash(HASH, Network::Mainnet).encode();
        assert_eq!(
            Address::decode(&encoded, Network::Testnet),
            Err(Error::InvalidAddress)
        );
    }

    #[test]
    fn script_pubkey_round_trip() {
        let addr = Address::script_hash(HASH, Network::Testnet);
        let script = addr.script_pubkey();
        assert_eq!(
            Address::from_script_pubkey(&script, Network::Testnet),
            Some(addr)
        );
    }

    #[test]
    fn public_key_serialization_policy() {
        let secp = secp256k1::Secp256k1::new();
        let secret = secp256k1::SecretKey::from_slice(&[0x42; 32]).unwrap();
        let public = secp256k1::PublicKey::from_secret_key(&secp, &secret);

        assert_eq!(
            serialize_public_key(&public, Network::Mainnet).unwrap().len(),
            33
        );
        assert_eq!(
            serialize_public_key(&public, Network::Testnet).unwrap().len(),
            65
        );
        assert!(matches!(
            serialize_public_key(&public, Network::Regtest),
            Err(Error::UnsupportedNetwork(_))
        ));
    }
}
