// Path: crates/types/src/events.rs

//! The kernel event vocabulary.
//!
//! Every state-changing operation appends one or more of these to the
//! hash-chained journal for indexer consumption. Field order inside each
//! variant is part of the wire contract and must not be reordered.

use crate::primitives::{Address, Amount, AuthHash, ChannelId, DomainId, IntentHash, PolicyId};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Union of all events emitted by kernel components.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum KernelEvent {
    /// A per-call pull executed directly through the pull executor.
    PullExecutedDirect {
        /// Authorization the pull ran under.
        auth_hash: AuthHash,
        /// Token moved.
        token: Address,
        /// Account debited.
        grantor: Address,
        /// Account credited.
        grantee: Address,
        /// Amount moved.
        amount: Amount,
    },
    /// A pull was recorded in the consent registry.
    PullExecuted {
        /// Authorization the pull ran under.
        auth_hash: AuthHash,
        /// Token moved.
        token: Address,
        /// Account debited.
        grantor: Address,
        /// Account credited.
        grantee: Address,
        /// Amount moved.
        amount: Amount,
        /// Cumulative pulled total after this record.
        cumulative: Amount,
    },
    /// The owner revoked an authorization.
    AuthorizationRevoked {
        /// Revoked authorization.
        auth_hash: AuthHash,
        /// Owner that revoked it.
        grantor: Address,
        /// Host timestamp of the revocation.
        ts: u64,
    },
    /// The owner updated an authorization's advisory cap.
    AuthorizationBudgetUpdated {
        /// Authorization whose cap changed.
        auth_hash: AuthHash,
        /// Previous cap, if any.
        old_cap: Option<Amount>,
        /// New cap, if any.
        new_cap: Option<Amount>,
    },
    /// An unauthenticated advisory sighting of an authorization. Never
    /// evidence of consent.
    AuthorizationObserved {
        /// Observed authorization.
        auth_hash: AuthHash,
        /// Claimed grantor.
        grantor: Address,
        /// Claimed grantee.
        grantee: Address,
        /// Claimed token.
        token: Address,
    },
    /// The controller changed an executor's trust flag.
    TrustedExecutorSet {
        /// Executor whose trust changed.
        executor: Address,
        /// New trust flag.
        trusted: bool,
    },
    /// A flow channel was opened.
    ChannelOpened {
        /// New channel id.
        id: ChannelId,
        /// Paying account.
        grantor: Address,
        /// Pulling account.
        grantee: Address,
        /// Token accrued.
        token: Address,
        /// Accrual rate per second.
        rate_per_second: Amount,
        /// Accrual ceiling.
        max_balance: Amount,
    },
    /// The grantor changed a channel's rate or ceiling.
    ChannelRateUpdated {
        /// Updated channel.
        id: ChannelId,
        /// Rate before the update.
        old_rate: Amount,
        /// Ceiling before the update.
        old_cap: Amount,
        /// Rate after the update.
        new_rate: Amount,
        /// Ceiling after the update.
        new_cap: Amount,
    },
    /// The grantor paused a channel.
    ChannelPaused {
        /// Paused channel.
        id: ChannelId,
    },
    /// The grantor resumed a channel.
    ChannelResumed {
        /// Resumed channel.
        id: ChannelId,
    },
    /// The grantor revoked a channel.
    ChannelRevoked {
        /// Revoked channel.
        id: ChannelId,
    },
    /// The grantee pulled accrued balance from a channel.
    Pulled {
        /// Channel pulled from.
        id: ChannelId,
        /// Receiving account.
        to: Address,
        /// Amount pulled.
        amount: Amount,
    },
    /// A spend policy was created.
    PolicyCreated {
        /// New policy id.
        policy_id: PolicyId,
        /// Creating (and controlling) account.
        grantor: Address,
        /// Metered account.
        grantee: Address,
        /// Scoped token.
        token: Address,
        /// Per-spend ceiling.
        max_per_pull: Amount,
        /// Per-epoch budget.
        max_per_epoch: Amount,
    },
    /// The grantor toggled a receiver on a policy allowlist.
    ReceiverAllowed {
        /// Policy whose allowlist changed.
        policy_id: PolicyId,
        /// Receiver toggled.
        receiver: Address,
        /// New allow flag.
        allowed: bool,
    },
    /// The grantor revoked a policy.
    PolicyRevoked {
        /// Revoked policy.
        policy_id: PolicyId,
    },
    /// A policy admitted and accounted a spend.
    PolicySpend {
        /// Policy that admitted the spend.
        policy_id: PolicyId,
        /// Epoch the spend was accounted in.
        epoch: u64,
        /// Admitted amount.
        amount: Amount,
        /// Epoch bucket total after this spend.
        new_epoch_total: Amount,
    },
    /// The owner revoked a flow intent.
    IntentRevoked {
        /// Revoked intent.
        intent_hash: IntentHash,
        /// Owner that revoked it.
        owner: Address,
        /// Host timestamp of the revocation.
        ts: u64,
    },
    /// A cross-domain move executed under a flow intent.
    RebalanceExecuted {
        /// Intent the move consumed.
        intent_hash: IntentHash,
        /// Source domain.
        src_domain: DomainId,
        /// Destination domain.
        dst_domain: DomainId,
        /// Token moved.
        token: Address,
        /// Amount moved.
        amount: Amount,
        /// Executor that drove the move.
        executor: Address,
    },
    /// The controller configured a domain in the directory.
    DomainConfigured {
        /// Configured domain.
        domain_id: DomainId,
        /// Bound adapter.
        adapter: Address,
        /// Bound destination receiver.
        destination: Address,
        /// Active flag.
        active: bool,
    },
    /// The controller changed an executor's approval in a domain.
    ExecutorApprovalSet {
        /// Domain the approval is scoped to.
        domain_id: DomainId,
        /// Executor whose approval changed.
        executor: Address,
        /// New approval flag.
        approved: bool,
    },
    /// The controller registered a channel with the router.
    ChannelRegistered {
        /// Registered channel.
        channel_id: ChannelId,
        /// Initial selection weight.
        weight: u64,
    },
    /// The controller updated a router target.
    ChannelUpdated {
        /// Updated channel.
        channel_id: ChannelId,
        /// New selection weight.
        weight: u64,
        /// New active flag.
        active: bool,
    },
    /// The router completed a routing step. Emitted even when the routed
    /// amount is zero, so operators see empty routes rather than silence.
    Routed {
        /// Channel selected for the step.
        channel_id: ChannelId,
        /// Receiving account.
        to: Address,
        /// Amount routed; may be zero.
        amount: Amount,
    },
    /// The controller configured a mesh destination.
    DestinationConfigured {
        /// Configured destination.
        destination: Address,
        /// Target share in basis points.
        target_bps: u16,
        /// Active flag.
        active: bool,
    },
    /// The controller reported an observed balance to the mesh.
    BalanceReported {
        /// Destination the balance belongs to.
        destination: Address,
        /// Reported balance.
        balance: Amount,
        /// Reported total across all destinations.
        total: Amount,
    },
    /// The mesh drove one allocation step through the router.
    MeshStep {
        /// Destination allocated to.
        dest: Address,
        /// Deficit against its target share.
        deficit: Amount,
        /// Amount requested from the router.
        sent: Amount,
    },
}
