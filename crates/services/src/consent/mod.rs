// Path: crates/services/src/consent/mod.rs

//! The consent registry: canonical revocation, cumulative accounting, and
//! owner binding for per-call pull authorizations.
//!
//! The registry is the audit spine of the per-call plane. Trusted
//! executors record every successful pull here; owners revoke and adjust
//! their advisory cap here; everyone else only reads. Ownership of an
//! entry is decided by the first recorded pull, so nobody can squat an
//! authorization hash before the legitimate grantor acts.

use crate::journal;
use crate::support::{acquire_latch, load_typed, release_latch, store_typed};
use self::keys::{entry_key, trusted_key, CONTROLLER_KEY, RECORD_LATCH_KEY};
use siphon_api::context::CallContext;
use siphon_api::state::{run_atomic, StateAccess};
use siphon_types::error::FlowError;
use siphon_types::events::KernelEvent;
use siphon_types::primitives::{Address, Amount, AuthHash};
use siphon_types::records::ConsentRecord;

mod keys;


/// The consent-registry component.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsentRegistry;

impl ConsentRegistry {
    /// Binds the controller to the caller. One-shot.
    pub fn initialize(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            if load_typed::<Address>(state, CONTROLLER_KEY)?.is_some() {
                return Err(FlowError::BadParameters(
                    "controller already bound".to_string(),
                ));
            }
            if ctx.caller.is_zero() {
                return Err(FlowError::BadAddress);
            }
            store_typed(state, CONTROLLER_KEY, &ctx.caller)
        })
    }

    /// Rotates the controller. Controller-only.
    pub fn set_controller(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        new_controller: Address,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            self.require_controller(state, ctx)?;
            if new_controller.is_zero() {
                return Err(FlowError::BadAddress);
            }
            store_typed(state, CONTROLLER_KEY, &new_controller)
        })
    }

    /// Adds or removes an executor from the trusted set. Controller-only.
    pub fn set_trusted_executor(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        executor: Address,
        trusted: bool,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            self.require_controller(state, ctx)?;
            if executor.is_zero() {
                return Err(FlowError::BadAddress);
            }
            store_typed(state, &trusted_key(&executor), &trusted)?;
            journal::emit(
                state,
                ctx,
                KernelEvent::TrustedExecutorSet { executor, trusted },
            )
        })
    }

    /// Records a successful pull under `auth_hash`.
    ///
    /// Restricted to trusted executors. Binds the entry's owner to
    /// `grantor` on first record; afterwards the owner is immutable and a
    /// differing grantor is rejected. The cumulative total must not
    /// overflow; there is deliberately no saturation.
    #[allow(clippy::too_many_arguments)]
    pub fn record_pull(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        auth_hash: AuthHash,
        token: Address,
        grantor: Address,
        grantee: Address,
        amount: Amount,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            if !self.is_trusted_executor(state, ctx.caller)? {
                return Err(FlowError::NotTrustedExecutor);
            }
            acquire_latch(state, RECORD_LATCH_KEY)?;

            let key = entry_key(&auth_hash);
            let mut entry: ConsentRecord = load_typed(state, &key)?.unwrap_or_default();
            match entry.owner {
                None => {
                    if grantor.is_zero() {
                        return Err(FlowError::BadAddress);
                    }
                    entry.owner = Some(grantor);
                }
                Some(owner) if owner != grantor => return Err(FlowError::GrantorMismatch),
                Some(_) => {}
            }
            entry.pulled_total = entry
                .pulled_total
                .checked_add(amount)
                .ok_or(FlowError::ArithmeticOverflow)?;
            store_typed(state, &key, &entry)?;

            journal::emit(
                state,
                ctx,
                KernelEvent::PullExecuted {
                    auth_hash,
                    token,
                    grantor,
                    grantee,
                    amount,
                    cumulative: entry.pulled_total,
                },
            )?;
            log::info!(
                "consent: recorded pull of {} under {} (total {})",
                amount,
                auth_hash,
                entry.pulled_total
            );
            release_latch(state, RECORD_LATCH_KEY)
        })
    }

    /// Revokes the authorization. Owner-only; one-way.
    pub fn revoke(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        auth_hash: AuthHash,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            let key = entry_key(&auth_hash);
            let mut entry = self.owned_entry(state, ctx, &key)?;
            if entry.revoked {
                return Err(FlowError::Revoked);
            }
            entry.revoked = true;
            store_typed(state, &key, &entry)?;
            journal::emit(
                state,
                ctx,
                KernelEvent::AuthorizationRevoked {
                    auth_hash,
                    grantor: ctx.caller,
                    ts: ctx.now,
                },
            )?;
            log::info!("consent: revoked {}", auth_hash);
            Ok(())
        })
    }

    /// Updates the advisory cap. Owner-only. The cap is never enforced
    /// here; budget enforcement is a higher layer's concern.
    pub fn set_cap(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        auth_hash: AuthHash,
        new_cap: Option<Amount>,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            let key = entry_key(&auth_hash);
            let mut entry = self.owned_entry(state, ctx, &key)?;
            let old_cap = entry.cap;
            entry.cap = new_cap;
            store_typed(state, &key, &entry)?;
            journal::emit(
                state,
                ctx,
                KernelEvent::AuthorizationBudgetUpdated {
                    auth_hash,
                    old_cap,
                    new_cap,
                },
            )
        })
    }

    /// Emits an advisory sighting of an authorization. Unauthenticated by
    /// design; consumers must never treat it as evidence of consent.
    pub fn observe(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        auth_hash: AuthHash,
        grantor: Address,
        grantee: Address,
        token: Address,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            journal::emit(
                state,
                ctx,
                KernelEvent::AuthorizationObserved {
                    auth_hash,
                    grantor,
                    grantee,
                    token,
                },
            )
        })
    }

    /// Whether `auth_hash` has been revoked.
    pub fn is_revoked(
        &self,
        state: &dyn StateAccess,
        auth_hash: AuthHash,
    ) -> Result<bool, FlowError> {
        Ok(self.entry(state, auth_hash)?.map(|e| e.revoked).unwrap_or(false))
    }

    /// Cumulative recorded pulls under `auth_hash`.
    pub fn pulled_total(
        &self,
        state: &dyn StateAccess,
        auth_hash: AuthHash,
    ) -> Result<Amount, FlowError> {
        Ok(self
            .entry(state, auth_hash)?
            .map(|e| e.pulled_total)
            .unwrap_or(Amount::ZERO))
    }

    /// The bound owner of `auth_hash`, if any pull has been recorded.
    pub fn owner_of(
        &self,
        state: &dyn StateAccess,
        auth_hash: AuthHash,
    ) -> Result<Option<Address>, FlowError> {
        Ok(self.entry(state, auth_hash)?.and_then(|e| e.owner))
    }

    /// The advisory cap of `auth_hash`, if set.
    pub fn cap_of(
        &self,
        state: &dyn StateAccess,
        auth_hash: AuthHash,
    ) -> Result<Option<Amount>, FlowError> {
        Ok(self.entry(state, auth_hash)?.and_then(|e| e.cap))
    }

    /// Whether `executor` is on the trusted set.
    pub fn is_trusted_executor(
        &self,
        state: &dyn StateAccess,
        executor: Address,
    ) -> Result<bool, FlowError> {
        Ok(load_typed(state, &trusted_key(&executor))?.unwrap_or(false))
    }

    fn entry(
        &self,
        state: &dyn StateAccess,
        auth_hash: AuthHash,
    ) -> Result<Option<ConsentRecord>, FlowError> {
        load_typed(state, &entry_key(&auth_hash))
    }

    fn owned_entry(
        &self,
        state: &dyn StateAccess,
        ctx: &CallContext,
        key: &[u8],
    ) -> Result<ConsentRecord, FlowError> {
        let entry: ConsentRecord =
            load_typed(state, key)?.ok_or(FlowError::UnknownAuthorization)?;
        match entry.owner {
            None => Err(FlowError::UnknownAuthorization),
            Some(owner) if owner != ctx.caller => Err(FlowError::NotOwner),
            Some(_) => Ok(entry),
        }
    }

    fn require_controller(
        &self,
        state: &dyn StateAccess,
        ctx: &CallContext,
    ) -> Result<(), FlowError> {
        let controller: Address =
            load_typed(state, CONTROLLER_KEY)?.ok_or(FlowError::NotController)?;
        if controller != ctx.caller {
            return Err(FlowError::NotController);
        }
        Ok(())
    }
}
