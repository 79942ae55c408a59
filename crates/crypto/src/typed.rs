// Path: crates/crypto/src/typed.rs

//! Canonical struct hashes for the signed consent payloads.
//!
//! `auth_hash` and `intent_hash` are the identifiers used by the consent
//! and intent registries and must match what wallets and indexers derive:
//! the keccak-256 of the type tag followed by each consent field as a
//! 32-byte word, signature excluded.

use crate::hash::{keccak256, word_of_address, word_of_amount, word_of_u64};
use siphon_types::consent::{Authorization, FlowIntent};
use siphon_types::primitives::{AuthHash, IntentHash};

const AUTHORIZATION_TYPE_INPUT: &[u8] = b"Authorization(address grantor,address grantee,address token,uint256 maxPerPull,uint64 validAfter,uint64 validBefore,uint64 nonce)";

const FLOW_INTENT_TYPE_INPUT: &[u8] = b"FlowIntent(address grantor,address executor,bytes32 srcDomain,bytes32 dstDomain,address token,uint256 maxTotal,uint64 validAfter,uint64 validBefore,uint64 nonce,bytes32 metadataHash)";

/// The canonical identifier of `auth`: its typed struct hash over the
/// seven consent fields in declaration order.
pub fn auth_hash(auth: &Authorization) -> AuthHash {
    let mut material = Vec::with_capacity(32 * 8);
    material.extend_from_slice(&keccak256(AUTHORIZATION_TYPE_INPUT));
    material.extend_from_slice(&word_of_address(auth.grantor));
    material.extend_from_slice(&word_of_address(auth.grantee));
    material.extend_from_slice(&word_of_address(auth.token));
    material.extend_from_slice(&word_of_amount(auth.max_per_pull));
    material.extend_from_slice(&word_of_u64(auth.valid_after));
    material.extend_from_slice(&word_of_u64(auth.valid_before));
    material.extend_from_slice(&word_of_u64(auth.nonce));
    AuthHash(keccak256(&material))
}

/// The canonical identifier of `intent`: its typed struct hash over the
/// ten consent fields in declaration order.
pub fn intent_hash(intent: &FlowIntent) -> IntentHash {
    let mut material = Vec::with_capacity(32 * 11);
    material.extend_from_slice(&keccak256(FLOW_INTENT_TYPE_INPUT));
    material.extend_from_slice(&word_of_address(intent.grantor));
    material.extend_from_slice(&word_of_address(intent.executor));
    material.extend_from_slice(&intent.src_domain.0);
    material.extend_from_slice(&intent.dst_domain.0);
    material.extend_from_slice(&word_of_address(intent.token));
    material.extend_from_slice(&word_of_amount(intent.max_total));
    material.extend_from_slice(&word_of_u64(intent.valid_after));
    material.extend_from_slice(&word_of_u64(intent.valid_before));
    material.extend_from_slice(&word_of_u64(intent.nonce));
    material.extend_from_slice(&intent.metadata_hash);
    IntentHash(keccak256(&material))
}
