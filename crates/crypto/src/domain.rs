// Path: crates/crypto/src/domain.rs

//! The signing-domain descriptor binding signatures to one verifying
//! instance.
//!
//! Two deployments of the same component, or the same component on two
//! hosts, produce different descriptors, so a signature collected for one
//! can never be replayed against the other.

use crate::hash::{keccak256, word_of_address, word_of_u64};
use siphon_types::primitives::Address;

/// Type tag covered by every domain descriptor.
const DOMAIN_TYPE_HASH_INPUT: &[u8] =
    b"SigningDomain(string name,string version,uint64 hostId,address verifyingInstance)";

/// The two-byte typed-payload prefix: 0x19 marks non-transaction data,
/// 0x01 the structured-domain scheme.
const TYPED_PREFIX: [u8; 2] = [0x19, 0x01];

/// A verifying instance's precomputed signing domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningDomain {
    name: String,
    version: String,
    host_id: u64,
    verifying_instance: Address,
    descriptor: [u8; 32],
}

impl SigningDomain {
    /// Builds the domain for one verifying instance and precomputes its
    /// descriptor.
    pub fn new(name: &str, version: &str, host_id: u64, verifying_instance: Address) -> Self {
        let mut material = Vec::with_capacity(32 * 5);
        material.extend_from_slice(&keccak256(DOMAIN_TYPE_HASH_INPUT));
        material.extend_from_slice(&keccak256(name.as_bytes()));
        material.extend_from_slice(&keccak256(version.as_bytes()));
        material.extend_from_slice(&word_of_u64(host_id));
        material.extend_from_slice(&word_of_address(verifying_instance));
        let descriptor = keccak256(&material);
        Self {
            name: name.to_string(),
            version: version.to_string(),
            host_id,
            verifying_instance,
            descriptor,
        }
    }

    /// The 32-byte domain descriptor.
    pub fn descriptor(&self) -> [u8; 32] {
        self.descriptor
    }

    /// The instance this domain binds signatures to.
    pub fn verifying_instance(&self) -> Address {
        self.verifying_instance
    }

    /// The digest a wallet signs for `struct_hash` under this domain:
    /// `keccak256(0x19 || 0x01 || descriptor || struct_hash)`.
    pub fn typed_digest(&self, struct_hash: [u8; 32]) -> [u8; 32] {
        let mut material = Vec::with_capacity(2 + 32 + 32);
        material.extend_from_slice(&TYPED_PREFIX);
        material.extend_from_slice(&self.descriptor);
        material.extend_from_slice(&struct_hash);
        keccak256(&material)
    }
}
