// Path: crates/services/src/adapter/mod.rs

//! The reference source adapter.
//!
//! One adapter instance backs one source domain. The controller registers
//! pull rights (the grantor and token behind each authorization hash) and
//! approves the callers allowed to drive pulls; the adapter then executes
//! each pull on its native ledger and records it in the consent registry,
//! refusing the moment the underlying authorization is revoked.
//!
//! State is namespaced by the adapter's own address, so several adapters
//! coexist in one store.

use crate::consent::ConsentRegistry;
use crate::support::{load_typed, store_typed};
use siphon_api::adapter::SourceAdapter;
use siphon_api::context::CallContext;
use siphon_api::state::{run_atomic, StateAccess};
use siphon_api::token::TokenLedger;
use siphon_types::error::FlowError;
use siphon_types::primitives::{Address, Amount, AuthHash};
use siphon_types::records::PullRight;


/// The reference adapter component.
pub struct DirectPullAdapter<L> {
    address: Address,
    ledger: L,
    registry: ConsentRegistry,
}

impl<L: TokenLedger> DirectPullAdapter<L> {
    /// Builds an adapter instance at `address`.
    pub fn new(address: Address, ledger: L) -> Self {
        Self {
            address,
            ledger,
            registry: ConsentRegistry,
        }
    }

    fn controller_key(&self) -> Vec<u8> {
        [b"adapter::".as_slice(), self.address.as_ref(), b"::controller"].concat()
    }

    fn right_key(&self, auth_hash: &AuthHash) -> Vec<u8> {
        [
            b"adapter::".as_slice(),
            self.address.as_ref(),
            b"::right::",
            auth_hash.as_ref(),
        ]
        .concat()
    }

    fn caller_key(&self, caller: &Address) -> Vec<u8> {
        [
            b"adapter::".as_slice(),
            self.address.as_ref(),
            b"::caller::",
            caller.as_ref(),
        ]
        .concat()
    }

    /// Binds the controller to the caller. One-shot.
    pub fn initialize(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            if load_typed::<Address>(state, &self.controller_key())?.is_some() {
                return Err(FlowError::BadParameters(
                    "controller already bound".to_string(),
                ));
            }
            if ctx.caller.is_zero() {
                return Err(FlowError::BadAddress);
            }
            store_typed(state, &self.controller_key(), &ctx.caller)
        })
    }

    /// Registers the pull right behind `auth_hash`. Controller-only.
    pub fn register_right(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        auth_hash: AuthHash,
        grantor: Address,
        token: Address,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            self.require_controller(state, ctx)?;
            if grantor.is_zero() || token.is_zero() {
                return Err(FlowError::BadAddress);
            }
            store_typed(state, &self.right_key(&auth_hash), &PullRight { grantor, token })
        })
    }

    /// Approves or disapproves a caller of [`SourceAdapter::pull`].
    /// Controller-only; the rebalancer is the expected approvee.
    pub fn set_caller_approval(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        caller: Address,
        approved: bool,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            self.require_controller(state, ctx)?;
            if caller.is_zero() {
                return Err(FlowError::BadAddress);
            }
            store_typed(state, &self.caller_key(&caller), &approved)
        })
    }

    fn require_controller(
        &self,
        state: &dyn StateAccess,
        ctx: &CallContext,
    ) -> Result<(), FlowError> {
        let controller: Address =
            load_typed(state, &self.controller_key())?.ok_or(FlowError::NotController)?;
        if controller != ctx.caller {
            return Err(FlowError::NotController);
        }
        Ok(())
    }
}

impl<L: TokenLedger> SourceAdapter for DirectPullAdapter<L> {
    fn address(&self) -> Address {
        self.address
    }

    fn right_of(
        &self,
        state: &dyn StateAccess,
        auth_hash: AuthHash,
    ) -> Result<Option<PullRight>, FlowError> {
        load_typed(state, &self.right_key(&auth_hash))
    }

    fn pull(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        auth_hash: AuthHash,
        to: Address,
        amount: Amount,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            let approved: bool =
                load_typed(state, &self.caller_key(&ctx.caller))?.unwrap_or(false);
            if !approved {
                return Err(FlowError::NotAuthorizedCaller);
            }
            let right: PullRight =
                load_typed(state, &self.right_key(&auth_hash))?
                    .ok_or(FlowError::UnknownAuthorization)?;
            if self.registry.is_revoked(state, auth_hash)? {
                return Err(FlowError::Revoked);
            }
            if to.is_zero() {
                return Err(FlowError::BadAddress);
            }
            if amount.is_zero() {
                return Err(FlowError::AmountZero);
            }

            let inner = ctx.reframe(self.address);
            self.ledger
                .transfer_from(state, &inner, right.token, right.grantor, to, amount)?;
            self.registry
                .record_pull(state, &inner, auth_hash, right.token, right.grantor, to, amount)?;
            log::info!(
                "adapter 0x{}: pulled {} under {} to 0x{}",
                hex::encode(self.address),
                amount,
                auth_hash,
                hex::encode(to)
            );
            Ok(())
        })
    }
}
