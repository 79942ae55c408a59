// Path: crates/types/src/codec.rs
//! Canonical SCALE encoding helpers for stored records.
//!
//! Every value persisted by a kernel component goes through these two
//! functions so the byte layout of the state is a single, stable,
//! deterministic encoding.

use crate::error::StateError;
use parity_scale_codec::{Decode, Encode};

/// Encodes a record into its canonical byte form.
pub fn to_bytes_canonical<T: Encode>(value: &T) -> Vec<u8> {
    value.encode()
}

/// Decodes a record from its canonical byte form.
///
/// Trailing bytes are rejected: a stored value must decode exactly, or the
/// state is considered corrupt.
pub fn from_bytes_canonical<T: Decode>(bytes: &[u8]) -> Result<T, StateError> {
    let mut input = bytes;
    let value = T::decode(&mut input).map_err(|e| StateError::InvalidValue(e.to_string()))?;
    if !input.is_empty() {
        return Err(StateError::InvalidValue(format!(
            "{} trailing bytes after canonical decode",
            input.len()
        )));
    }
    Ok(value)
}
