// Path: crates/crypto/src/signer.rs

//! A local secp256k1 signer.
//!
//! Wallet-side tooling: produces the 65-byte `r || s || v` signatures the
//! kernel verifies. Used by the test suites and by operator tooling; the
//! kernel itself never signs.

use crate::ecdsa::address_of_key;
use k256::ecdsa::SigningKey;
use siphon_types::error::FlowError;
use siphon_types::primitives::Address;

/// A signing key held in memory together with its derived address.
#[derive(Clone)]
pub struct LocalSigner {
    key: SigningKey,
    address: Address,
}

impl LocalSigner {
    /// Builds a signer from 32 seed bytes. The seed must be a valid
    /// nonzero scalar; fixed test seeds satisfy this.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let key = SigningKey::from_slice(&seed).expect("seed is a valid secp256k1 scalar");
        let address = address_of_key(key.verifying_key());
        Self { key, address }
    }

    /// The signer's 20-byte address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Signs a 32-byte digest, returning `r || s || v` with `v` in
    /// `{27, 28}` and `s` normalized to the low half of the curve order.
    pub fn sign_digest(&self, digest: [u8; 32]) -> Result<Vec<u8>, FlowError> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| FlowError::BadSignature(format!("signing failed: {e}")))?;
        let mut out = Vec::with_capacity(65);
        out.extend_from_slice(&signature.to_bytes());
        out.push(27 + recovery_id.to_byte());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_address_is_stable() {
        let a = LocalSigner::from_seed([0x31; 32]);
        let b = LocalSigner::from_seed([0x31; 32]);
        assert_eq!(a.address(), b.address());
        assert!(!a.address().is_zero());
    }

    #[test]
    fn signatures_are_65_bytes_with_canonical_v() {
        let signer = LocalSigner::from_seed([0x31; 32]);
        let signature = signer.sign_digest([5u8; 32]).expect("sign");
        assert_eq!(signature.len(), 65);
        assert!(signature[64] == 27 || signature[64] == 28);
    }
}
