/// Smallest output value, in zatoshi, that the network will relay
pub const DUST_THRESHOLD: i64 = 600;

/// Flat transaction fee, in zatoshi
pub const TX_FEE: i64 = 10_000;

/// Default expiry height for newly built transactions
///
/// Consensus requires `expiry_height` to be above the current chain height;
/// this ceiling was picked with a very wide margin but will eventually be
/// passed by the chain.
pub const TX_EXPIRY_HEIGHT: u32 = 6_000_000;

/// Default sequence number for transaction inputs
pub const MAX_SEQUENCE: u32 = 0xFFFF_FFFF;

/// Maximum number of UTXOs requested from the indexer in one call
pub const UTXO_LIMIT: u64 = 999_999;
