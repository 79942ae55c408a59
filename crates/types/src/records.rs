// Path: crates/types/src/records.rs

//! Stored state records, one per component entry kind.
//!
//! Each record is the canonical SCALE-encoded value behind one prefixed
//! state key. Records never embed their own key; the key carries the id.

use crate::primitives::{Address, Amount, PolicyId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Consent-registry entry for one authorization hash.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ConsentRecord {
    /// Grantor of the first recorded pull. Binds exactly once and never
    /// changes afterwards; `None` until the first record.
    pub owner: Option<Address>,
    /// One-way revocation latch.
    pub revoked: bool,
    /// Cumulative total of every recorded pull. Monotone non-decreasing;
    /// overflow is a fatal protocol error, never a saturation.
    pub pulled_total: Amount,
    /// Advisory soft cap set by the owner. Not enforced here; higher
    /// layers and off-host consumers read it.
    pub cap: Option<Amount>,
}

/// Streaming flow-channel entry.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    /// Account that pays; immutable after open.
    pub grantor: Address,
    /// Account permitted to pull accrued balance.
    pub grantee: Address,
    /// Token whose balance moves; immutable after open.
    pub token: Address,
    /// Accrual rate in token units per second. Positive while live.
    pub rate_per_second: Amount,
    /// Ceiling on the accrued balance. Positive while live.
    pub max_balance: Amount,
    /// Balance accrued and not yet pulled. Never exceeds `max_balance`.
    pub accrued: Amount,
    /// Timestamp of the last accrual synchronization.
    pub last_update: u64,
    /// While set, no accrual and no pulls.
    pub paused: bool,
    /// One-way revocation latch. Accrued balance at revocation is forfeit.
    pub revoked: bool,
    /// Spend policy consulted before each pull, if any.
    pub policy_ref: Option<PolicyId>,
}

/// Spend-policy entry enforced per epoch.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PolicyRecord {
    /// Account that created the policy; the only principal able to mutate
    /// rules or revoke.
    pub grantor: Address,
    /// Account whose spending the policy meters.
    pub grantee: Address,
    /// Token this policy is scoped to.
    pub token: Address,
    /// Ceiling on any single spend. Never exceeds `max_per_epoch`.
    pub max_per_pull: Amount,
    /// Budget per epoch of the shared clock.
    pub max_per_epoch: Amount,
    /// Epoch index the bucket below belongs to. Rolled lazily: the first
    /// call observing a newer epoch resets the bucket before accounting.
    pub current_epoch: u64,
    /// Spend accumulated in `current_epoch`.
    pub spent_this_epoch: Amount,
    /// Once set, spends must name an allowlisted receiver.
    pub receiver_rules_active: bool,
    /// One-way revocation latch.
    pub revoked: bool,
}

/// Intent-registry entry for one intent hash.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct IntentRecord {
    /// Grantor bound on the first successful consume; `None` before.
    pub owner: Option<Address>,
    /// One-way revocation latch.
    pub revoked: bool,
    /// Cumulative consumed amount. Never exceeds the intent's `max_total`.
    pub moved_so_far: Amount,
}

/// Domain-directory entry.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    /// Adapter bound to this domain; performs pulls on its native ledger.
    pub adapter: Address,
    /// Receiving address for value arriving in this domain.
    pub destination: Address,
    /// Inactive domains are never routable.
    pub active: bool,
}

/// Per-channel route target known to the adaptive router.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    /// Selection weight; the greatest active weight wins a routing step.
    pub weight: u64,
    /// Inactive targets are skipped.
    pub active: bool,
}

/// Per-destination allocation target known to the settlement mesh.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DestinationTarget {
    /// Target share of the reported total, in basis points. The sum
    /// across destinations is intentionally unconstrained.
    pub target_bps: u16,
    /// Inactive destinations are never allocated to.
    pub active: bool,
}

/// A pull right registered with a domain adapter: the ledger-side facts
/// the adapter needs to execute pulls under one authorization hash.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PullRight {
    /// Account debited by pulls under this right.
    pub grantor: Address,
    /// Token the right is denominated in.
    pub token: Address,
}
