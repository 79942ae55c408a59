// Path: crates/api/src/adapter.rs
//! The source-adapter boundary of the cross-domain plane.

use crate::context::CallContext;
use crate::state::StateAccess;
use siphon_types::error::FlowError;
use siphon_types::primitives::{Address, Amount, AuthHash};
use siphon_types::records::PullRight;

/// A downstream executor bound to one source domain.
///
/// An adapter holds controller-registered pull rights and performs the
/// actual value movement on its native ledger when the rebalancer drives a
/// cross-domain step. The rebalancer consults [`SourceAdapter::right_of`]
/// to cross-check the intent's grantor and token against the right before
/// committing any budget downstream.
pub trait SourceAdapter {
    /// The adapter's own component address.
    fn address(&self) -> Address;

    /// The registered pull right for `auth_hash`, if any.
    fn right_of(
        &self,
        state: &dyn StateAccess,
        auth_hash: AuthHash,
    ) -> Result<Option<PullRight>, FlowError>;

    /// Pulls `amount` under `auth_hash` from the right's grantor to `to`
    /// on the adapter's native ledger.
    fn pull(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        auth_hash: AuthHash,
        to: Address,
        amount: Amount,
    ) -> Result<(), FlowError>;
}
