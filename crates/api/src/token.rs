// Path: crates/api/src/token.rs
//! The external token-ledger contract the kernel consumes.

use crate::context::CallContext;
use crate::state::StateAccess;
use siphon_types::error::FlowError;
use siphon_types::primitives::{Address, Amount};

/// The one operation the kernel requires of the underlying token ledger.
///
/// The ledger moves `amount` of `token` from `owner` to `recipient`
/// provided the allowance granted by `owner` to the calling component
/// (`ctx.caller`) covers it and the owner's balance suffices; both the
/// allowance and the balance are decremented. Any refusal surfaces as
/// [`FlowError::TransferFail`] with no state change — the allowance is the
/// one shared resource the kernel does not coordinate transactionally.
pub trait TokenLedger {
    /// Moves `amount` of `token` from `owner` to `recipient` on the
    /// spending authority of `ctx.caller`.
    fn transfer_from(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        token: Address,
        owner: Address,
        recipient: Address,
        amount: Amount,
    ) -> Result<(), FlowError>;
}
