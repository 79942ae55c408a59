// Path: crates/crypto/src/hash.rs

//! Keccak-256 and the 32-byte word encodings used by typed hashing.

use siphon_types::primitives::{Address, Amount};

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    alloy_primitives::keccak256(data).0
}

/// An address left-padded into a 32-byte hashing word.
pub fn word_of_address(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&address.0);
    word
}

/// A u64 big-endian right-aligned into a 32-byte hashing word.
pub fn word_of_u64(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// An amount as its 32-byte big-endian hashing word.
pub fn word_of_amount(amount: Amount) -> [u8; 32] {
    amount.to_be_bytes()
}
