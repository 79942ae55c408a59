// Path: crates/services/src/policy/mod.rs

//! The epoch policy enforcer.
//!
//! A policy meters one grantee's spending of one token against a per-call
//! ceiling, a per-epoch budget, and an optional receiver allowlist. All
//! policies constructed over the same clock parameters share the same
//! epoch boundaries. Epoch rollover is lazy: nothing runs at the boundary
//! itself; the first admission observing a newer epoch resets the bucket
//! before accounting.

use crate::clock::UniversalClock;
use crate::journal;
use crate::support::{acquire_latch, load_typed, release_latch, store_typed};
use self::keys::{allow_key, entry_key, CONSUME_LATCH_KEY};
use siphon_api::context::CallContext;
use siphon_api::state::{run_atomic, StateAccess};
use siphon_types::error::FlowError;
use siphon_types::events::KernelEvent;
use siphon_types::primitives::{Address, Amount, PolicyId};
use siphon_types::records::PolicyRecord;

mod keys;


/// The policy-enforcer component. Holds an immutable handle to the epoch
/// clock it shares with every sibling policy instance on the host.
#[derive(Debug, Clone, Copy)]
pub struct PolicyEnforcer {
    clock: UniversalClock,
}

impl PolicyEnforcer {
    /// Builds an enforcer over the given epoch clock.
    pub fn new(clock: UniversalClock) -> Self {
        Self { clock }
    }

    /// The shared epoch clock.
    pub fn clock(&self) -> &UniversalClock {
        &self.clock
    }

    /// Creates a policy under `policy_id`, bound to the caller as grantor.
    #[allow(clippy::too_many_arguments)]
    pub fn create_policy(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        policy_id: PolicyId,
        grantee: Address,
        token: Address,
        max_per_pull: Amount,
        max_per_epoch: Amount,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            if policy_id.is_zero() {
                return Err(FlowError::BadId);
            }
            let key = entry_key(&policy_id);
            if state.get(&key)?.is_some() {
                return Err(FlowError::BadId);
            }
            if grantee.is_zero() || token.is_zero() {
                return Err(FlowError::BadAddress);
            }
            if max_per_pull.is_zero() {
                return Err(FlowError::AmountZero);
            }
            if max_per_pull > max_per_epoch {
                return Err(FlowError::BadParameters(
                    "max_per_pull exceeds max_per_epoch".to_string(),
                ));
            }

            let record = PolicyRecord {
                grantor: ctx.caller,
                grantee,
                token,
                max_per_pull,
                max_per_epoch,
                current_epoch: self.clock.current_epoch(ctx.now),
                spent_this_epoch: Amount::ZERO,
                receiver_rules_active: false,
                revoked: false,
            };
            store_typed(state, &key, &record)?;
            journal::emit(
                state,
                ctx,
                KernelEvent::PolicyCreated {
                    policy_id,
                    grantor: ctx.caller,
                    grantee,
                    token,
                    max_per_pull,
                    max_per_epoch,
                },
            )
        })
    }

    /// Toggles a receiver on the allowlist. Grantor-only. The first rule
    /// ever set flips the policy into allowlist mode; thereafter entries
    /// are toggled individually.
    pub fn set_receiver_allowed(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        policy_id: PolicyId,
        receiver: Address,
        allowed: bool,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            let key = entry_key(&policy_id);
            let mut record: PolicyRecord = load_typed(state, &key)?.ok_or(FlowError::BadId)?;
            if record.grantor != ctx.caller {
                return Err(FlowError::NotGrantor);
            }
            if receiver.is_zero() {
                return Err(FlowError::BadAddress);
            }
            if !record.receiver_rules_active {
                record.receiver_rules_active = true;
                store_typed(state, &key, &record)?;
            }
            store_typed(state, &allow_key(&policy_id, &receiver), &allowed)?;
            journal::emit(
                state,
                ctx,
                KernelEvent::ReceiverAllowed {
                    policy_id,
                    receiver,
                    allowed,
                },
            )
        })
    }

    /// Revokes the policy. Grantor-only; one-way.
    pub fn revoke_policy(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        policy_id: PolicyId,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            let key = entry_key(&policy_id);
            let mut record: PolicyRecord = load_typed(state, &key)?.ok_or(FlowError::BadId)?;
            if record.grantor != ctx.caller {
                return Err(FlowError::NotGrantor);
            }
            if record.revoked {
                return Err(FlowError::Revoked);
            }
            record.revoked = true;
            store_typed(state, &key, &record)?;
            journal::emit(state, ctx, KernelEvent::PolicyRevoked { policy_id })
        })
    }

    /// Admits and accounts a spend of `amount` to `to` by the caller.
    ///
    /// The order is fixed: liveness, caller, per-call ceiling, lazy epoch
    /// rollover, epoch budget, receiver rules, then commit. The bucket is
    /// reset to zero before this call is accounted whenever the observed
    /// epoch differs from the stored one.
    pub fn check_and_consume(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        policy_id: PolicyId,
        to: Address,
        amount: Amount,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            acquire_latch(state, CONSUME_LATCH_KEY)?;

            let key = entry_key(&policy_id);
            let mut record: PolicyRecord = load_typed(state, &key)?.ok_or(FlowError::BadId)?;
            if record.revoked {
                return Err(FlowError::Revoked);
            }
            if ctx.caller != record.grantee {
                return Err(FlowError::NotGrantee);
            }
            if amount.is_zero() {
                return Err(FlowError::AmountZero);
            }
            if amount > record.max_per_pull {
                return Err(FlowError::ExceedsPerCall);
            }

            let epoch = self.clock.current_epoch(ctx.now);
            if epoch != record.current_epoch {
                record.current_epoch = epoch;
                record.spent_this_epoch = Amount::ZERO;
            }

            let spent = record
                .spent_this_epoch
                .checked_add(amount)
                .ok_or(FlowError::ArithmeticOverflow)?;
            if spent > record.max_per_epoch {
                return Err(FlowError::ExceedsEpoch);
            }

            if record.receiver_rules_active && !self.is_receiver_allowed(state, policy_id, to)? {
                return Err(FlowError::ReceiverForbidden);
            }

            record.spent_this_epoch = spent;
            store_typed(state, &key, &record)?;
            journal::emit(
                state,
                ctx,
                KernelEvent::PolicySpend {
                    policy_id,
                    epoch,
                    amount,
                    new_epoch_total: spent,
                },
            )?;
            log::debug!(
                "policy: {} spent {} in epoch {} (bucket {})",
                policy_id,
                amount,
                epoch,
                spent
            );
            release_latch(state, CONSUME_LATCH_KEY)
        })
    }

    /// The stored record for `policy_id`, if any.
    pub fn policy_of(
        &self,
        state: &dyn StateAccess,
        policy_id: PolicyId,
    ) -> Result<Option<PolicyRecord>, FlowError> {
        load_typed(state, &entry_key(&policy_id))
    }

    /// Whether `receiver` is currently allowlisted on `policy_id`.
    pub fn is_receiver_allowed(
        &self,
        state: &dyn StateAccess,
        policy_id: PolicyId,
        receiver: Address,
    ) -> Result<bool, FlowError> {
        Ok(load_typed(state, &allow_key(&policy_id, &receiver))?.unwrap_or(false))
    }
}
