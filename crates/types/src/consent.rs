// Path: crates/types/src/consent.rs

//! Signed consent payloads: the per-call pull authorization and the
//! cross-domain flow intent.
//!
//! Both are created and signed off-host by the grantor's wallet, presented
//! whole to the kernel, and identified everywhere else by their canonical
//! struct hash (signature excluded). The hashing itself lives in
//! `siphon_crypto`; these are the plain data carriers.

use crate::primitives::{Address, Amount, AuthHash, DomainId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Per-call pull consent: the grantor authorizes the grantee to pull up to
/// `max_per_pull` of `token` per call, inside `[valid_after, valid_before]`,
/// until revoked. Repeated pulls under one authorization are permitted;
/// there is deliberately no per-call nonce.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// Account that pays; the only principal able to revoke.
    pub grantor: Address,
    /// Account permitted to initiate pulls; also the receiver.
    pub grantee: Address,
    /// Token whose balance moves.
    pub token: Address,
    /// Ceiling on any single pull.
    pub max_per_pull: Amount,
    /// First second (inclusive) at which pulls are valid.
    pub valid_after: u64,
    /// Last second (inclusive) at which pulls are valid.
    pub valid_before: u64,
    /// Distinguishes otherwise-identical authorizations.
    pub nonce: u64,
}

/// An [`Authorization`] together with the grantor's detached 65-byte
/// `r || s || v` signature over its typed digest.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SignedAuthorization {
    /// The consent fields covered by the signature.
    pub auth: Authorization,
    /// Detached signature; excluded from `auth_hash`.
    pub signature: Vec<u8>,
}

/// Cross-domain liquidity consent: the grantor authorizes `executor` to
/// move up to `max_total` of `token` cumulatively from `src_domain` to
/// `dst_domain`.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FlowIntent {
    /// Account that pays; the only principal able to revoke the intent.
    pub grantor: Address,
    /// Actor permitted to invoke cross-domain moves under this intent.
    pub executor: Address,
    /// Domain the value leaves.
    pub src_domain: DomainId,
    /// Domain the value arrives in.
    pub dst_domain: DomainId,
    /// Token whose balance moves.
    pub token: Address,
    /// Cumulative cap across every consume of this intent.
    pub max_total: Amount,
    /// First second (inclusive) at which consumes are valid.
    pub valid_after: u64,
    /// Last second (inclusive) at which consumes are valid.
    pub valid_before: u64,
    /// Distinguishes otherwise-identical intents.
    pub nonce: u64,
    /// Commitment to off-protocol routing metadata.
    pub metadata_hash: [u8; 32],
}

/// The envelope presented to the rebalancer: the intent, the id of the
/// per-call pull authority backing it on the source domain, and the
/// grantor's detached signature over the intent's typed digest.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FlowIntentEnvelope {
    /// The consent fields covered by the signature.
    pub intent: FlowIntent,
    /// Pull authority on the source domain; its liveness is re-checked
    /// against the consent registry before every move.
    pub auth_hash: AuthHash,
    /// Detached signature; excluded from `intent_hash`.
    pub signature: Vec<u8>,
}
