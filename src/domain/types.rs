//! Core type definitions for Agri Anchor

/// 32-byte hash (SHA-256 digest of a canonical record)
pub type Hash256 = [u8; 32];

/// 32-byte transaction hash returned by `eth_sendRawTransaction`
pub type TxHash = [u8; 32];

/// Encode a transaction hash the way block explorers print it (`0x`-prefixed).
pub fn tx_hash_hex(tx_hash: &TxHash) -> String {
    format!("0x{}", hex::encode(tx_hash))
}
