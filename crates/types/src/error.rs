// Path: crates/types/src/error.rs
//! Error types for the siphon kernel.

use thiserror::Error;

/// Errors raised by a state backend.
#[derive(Error, Debug)]
pub enum StateError {
    /// An error occurred in the state backend.
    #[error("State backend error: {0}")]
    Backend(String),
    /// A stored value could not be decoded into its record type.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// An error occurred while writing to the state.
    #[error("State write error: {0}")]
    WriteError(String),
}

/// The complete, non-overlapping failure taxonomy of the kernel.
///
/// Every public operation fails with exactly one of these kinds, and a
/// failing operation leaves all touched components in their pre-call
/// state. Failures from downstream components bubble unchanged.
#[derive(Error, Debug)]
pub enum FlowError {
    // --- Authorization ---
    /// Caller is not the grantor of the target object.
    #[error("caller is not the grantor")]
    NotGrantor,
    /// Caller is not the grantee of the target object.
    #[error("caller is not the grantee")]
    NotGrantee,
    /// Caller is not the bound owner of the target entry.
    #[error("caller is not the owner")]
    NotOwner,
    /// Caller is not the component controller.
    #[error("caller is not the controller")]
    NotController,
    /// Caller is not on the trusted-executor allowlist.
    #[error("caller is not a trusted executor")]
    NotTrustedExecutor,
    /// Caller is neither the designated executor nor the controller.
    #[error("caller is not authorized for this operation")]
    NotAuthorizedCaller,
    /// The executor is not approved for the named domain, or the domain is
    /// inactive.
    #[error("executor is not approved for domain")]
    ExecutorForbidden,

    // --- Temporal ---
    /// The authorization window has not opened yet.
    #[error("authorization is not yet valid")]
    TooSoon,
    /// The authorization window has closed.
    #[error("authorization has expired")]
    Expired,

    // --- Limits ---
    /// A zero amount was supplied where a positive one is required.
    #[error("amount must be positive")]
    AmountZero,
    /// The amount exceeds the per-call ceiling.
    #[error("amount exceeds the per-call ceiling")]
    ExceedsPerCall,
    /// The amount would exceed the per-epoch budget.
    #[error("amount exceeds the remaining epoch budget")]
    ExceedsEpoch,
    /// The amount exceeds the channel's accrued balance.
    #[error("amount exceeds the accrued balance")]
    ExceedsAccrued,
    /// The amount would exceed the intent's cumulative cap.
    #[error("amount exceeds the intent cap")]
    CapExceeded,

    // --- State ---
    /// The target object has been revoked.
    #[error("target has been revoked")]
    Revoked,
    /// The channel is paused.
    #[error("channel is paused")]
    Paused,
    /// No authorization entry is bound under this hash.
    #[error("unknown authorization")]
    UnknownAuthorization,
    /// No intent entry is bound under this hash.
    #[error("unknown intent")]
    UnknownIntent,
    /// A channel already exists under this id.
    #[error("channel already exists")]
    ChannelExists,
    /// The router holds no active route target.
    #[error("no active route")]
    NoActiveRoute,
    /// The destination domain has no configured receiver.
    #[error("destination domain has no receiver")]
    NoDstReceiver,
    /// The route target is registered but not active.
    #[error("channel is inactive")]
    ChannelInactive,
    /// The recorded grantor does not match the presented one.
    #[error("grantor mismatch")]
    GrantorMismatch,
    /// The recorded token does not match the presented one.
    #[error("token mismatch")]
    TokenMismatch,
    /// The receiver is not on the policy allowlist.
    #[error("receiver is not allowed by policy")]
    ReceiverForbidden,

    // --- Input ---
    /// A zero address was supplied where a real one is required.
    #[error("bad address")]
    BadAddress,
    /// A structurally invalid parameter was supplied.
    #[error("bad parameters: {0}")]
    BadParameters(String),
    /// The signature is malformed or does not authorize the payload.
    #[error("bad signature: {0}")]
    BadSignature(String),
    /// The id is all-zero, unknown, or already taken.
    #[error("bad id")]
    BadId,

    // --- External ---
    /// The token ledger refused the transfer.
    #[error("token transfer failed")]
    TransferFail,
    /// The source adapter refused the pull.
    #[error("adapter pull failed")]
    PullFail,

    // --- Integrity ---
    /// A component was re-entered while an operation was in flight.
    #[error("reentrant call")]
    Reentrancy,
    /// 256-bit arithmetic overflowed; the call aborts with no state change.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// A state backend fault.
    #[error("state error: {0}")]
    State(#[from] StateError),
}
