// Path: crates/crypto/src/ecdsa.rs

//! ECDSA recovery for key-holder accounts.
//!
//! Signatures are 65 bytes `r || s || v` over a 32-byte digest. `v` must
//! be 27 or 28 and `s` must be in the low half of the curve order; a
//! malleated high-`s` twin of a valid signature is rejected, not
//! normalized.

use crate::hash::keccak256;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use siphon_types::error::FlowError;
use siphon_types::primitives::Address;

/// Byte length of a recoverable signature.
pub const SIGNATURE_LEN: usize = 65;

/// Recovers the signing address of `signature` over `digest`.
pub fn recover_signer(digest: [u8; 32], signature: &[u8]) -> Result<Address, FlowError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(FlowError::BadSignature(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LEN,
            signature.len()
        )));
    }
    let v = signature[64];
    if v != 27 && v != 28 {
        return Err(FlowError::BadSignature(format!("invalid v: {v}")));
    }
    let recovery_id = RecoveryId::from_byte(v - 27)
        .ok_or_else(|| FlowError::BadSignature("invalid recovery id".to_string()))?;

    let parsed = Signature::from_slice(&signature[..64])
        .map_err(|e| FlowError::BadSignature(format!("malformed r/s: {e}")))?;
    if parsed.normalize_s().is_some() {
        return Err(FlowError::BadSignature("high-s signature".to_string()));
    }

    let key = VerifyingKey::recover_from_prehash(&digest, &parsed, recovery_id)
        .map_err(|e| FlowError::BadSignature(format!("recovery failed: {e}")))?;
    Ok(address_of_key(&key))
}

/// The 20-byte address of a secp256k1 public key: the low 20 bytes of the
/// keccak-256 of its uncompressed encoding without the 0x04 tag.
pub fn address_of_key(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    let digest = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..]);
    Address(address)
}
