// Path: crates/services/src/channel/mod.rs

//! The streaming flow channel.
//!
//! A channel accrues pullable balance continuously at a per-second rate up
//! to a ceiling. Two rules drive every operation: accrual math is
//! deterministic, and any state-affecting operation synchronizes the
//! accrued balance to the current host time before it does anything else.
//! Paused and revoked channels accrue nothing, and the elapsed time while
//! off is never banked retroactively.

use crate::journal;
use crate::policy::PolicyEnforcer;
use crate::support::{acquire_latch, load_typed, release_latch, store_typed};
use self::keys::{entry_key, latch_key};
use siphon_api::context::CallContext;
use siphon_api::state::{run_atomic, StateAccess};
use siphon_api::token::TokenLedger;
use siphon_types::error::FlowError;
use siphon_types::events::KernelEvent;
use siphon_types::primitives::{Address, Amount, ChannelId, PolicyId};
use siphon_types::records::ChannelRecord;

mod keys;


/// The flow-channel component.
pub struct FlowChannel<L> {
    address: Address,
    ledger: L,
    policy: PolicyEnforcer,
}

impl<L: TokenLedger> FlowChannel<L> {
    /// Builds the channel component. `address` is the instance's own
    /// principal: grantors grant their token allowance to it, and it is
    /// the spender of every channel pull.
    pub fn new(address: Address, ledger: L, policy: PolicyEnforcer) -> Self {
        Self {
            address,
            ledger,
            policy,
        }
    }

    /// The component's own address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Opens a channel under `id` with the caller as grantor.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        id: ChannelId,
        grantee: Address,
        token: Address,
        rate_per_second: Amount,
        max_balance: Amount,
        policy_ref: Option<PolicyId>,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            if id.is_zero() {
                return Err(FlowError::BadId);
            }
            let key = entry_key(&id);
            if state.get(&key)?.is_some() {
                return Err(FlowError::ChannelExists);
            }
            if grantee.is_zero() || token.is_zero() {
                return Err(FlowError::BadAddress);
            }
            if rate_per_second.is_zero() || max_balance.is_zero() {
                return Err(FlowError::BadParameters(
                    "rate and ceiling must be positive".to_string(),
                ));
            }

            let record = ChannelRecord {
                grantor: ctx.caller,
                grantee,
                token,
                rate_per_second,
                max_balance,
                accrued: Amount::ZERO,
                last_update: ctx.now,
                paused: false,
                revoked: false,
                policy_ref,
            };
            store_typed(state, &key, &record)?;
            journal::emit(
                state,
                ctx,
                KernelEvent::ChannelOpened {
                    id,
                    grantor: ctx.caller,
                    grantee,
                    token,
                    rate_per_second,
                    max_balance,
                },
            )?;
            log::info!("channel: opened {} for 0x{}", id, hex::encode(grantee));
            Ok(())
        })
    }

    /// Synchronizes accrual to the current host time. Public; anyone may
    /// tick a channel forward.
    pub fn accrue(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        id: ChannelId,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            let key = entry_key(&id);
            let mut record: ChannelRecord = load_typed(state, &key)?.ok_or(FlowError::BadId)?;
            sync(&mut record, ctx.now);
            store_typed(state, &key, &record)
        })
    }

    /// Pulls `amount` of accrued balance to `to`. Grantee-only.
    ///
    /// Order inside the operation: policy admission first (it may refuse),
    /// then the accrued deduction, then the external token call, so a
    /// reentrant callback can never respend the same accrual. The whole
    /// operation commits or rolls back atomically.
    pub fn pull(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        id: ChannelId,
        to: Address,
        amount: Amount,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            let latch = latch_key(&id);
            acquire_latch(state, &latch)?;

            let key = entry_key(&id);
            let mut record: ChannelRecord = load_typed(state, &key)?.ok_or(FlowError::BadId)?;
            if ctx.caller != record.grantee {
                return Err(FlowError::NotGrantee);
            }
            if record.paused {
                return Err(FlowError::Paused);
            }
            if record.revoked {
                return Err(FlowError::Revoked);
            }
            if to.is_zero() {
                return Err(FlowError::BadAddress);
            }

            sync(&mut record, ctx.now);
            if amount.is_zero() {
                return Err(FlowError::AmountZero);
            }
            if amount > record.accrued {
                return Err(FlowError::ExceedsAccrued);
            }

            if let Some(policy_id) = record.policy_ref {
                self.policy
                    .check_and_consume(state, ctx, policy_id, to, amount)?;
            }

            record.accrued = record
                .accrued
                .checked_sub(amount)
                .ok_or(FlowError::ArithmeticOverflow)?;
            store_typed(state, &key, &record)?;

            self.ledger.transfer_from(
                state,
                &ctx.reframe(self.address),
                record.token,
                record.grantor,
                to,
                amount,
            )?;

            journal::emit(state, ctx, KernelEvent::Pulled { id, to, amount })?;
            log::info!(
                "channel: {} pulled {} to 0x{}",
                id,
                amount,
                hex::encode(to)
            );
            release_latch(state, &latch)
        })
    }

    /// Pauses accrual and pulls. Grantor-only. Balance accrued up to this
    /// instant is preserved.
    pub fn pause(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        id: ChannelId,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            let key = entry_key(&id);
            let mut record = self.granted_entry(state, ctx, &key)?;
            sync(&mut record, ctx.now);
            record.paused = true;
            store_typed(state, &key, &record)?;
            journal::emit(state, ctx, KernelEvent::ChannelPaused { id })
        })
    }

    /// Resumes accrual from now. Grantor-only; refused on a revoked
    /// channel. The paused window earns nothing retroactively.
    pub fn resume(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        id: ChannelId,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            let key = entry_key(&id);
            let mut record = self.granted_entry(state, ctx, &key)?;
            if record.revoked {
                return Err(FlowError::Revoked);
            }
            sync(&mut record, ctx.now);
            record.paused = false;
            record.last_update = ctx.now;
            store_typed(state, &key, &record)?;
            journal::emit(state, ctx, KernelEvent::ChannelResumed { id })
        })
    }

    /// Revokes the channel. Grantor-only; one-way. Whatever is accrued
    /// and unpulled at this instant is forfeit.
    pub fn revoke(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        id: ChannelId,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            let key = entry_key(&id);
            let mut record = self.granted_entry(state, ctx, &key)?;
            if record.revoked {
                return Err(FlowError::Revoked);
            }
            sync(&mut record, ctx.now);
            record.revoked = true;
            store_typed(state, &key, &record)?;
            journal::emit(state, ctx, KernelEvent::ChannelRevoked { id })?;
            log::info!("channel: revoked {}", id);
            Ok(())
        })
    }

    /// Changes rate and ceiling. Grantor-only; both must stay positive.
    /// Earnings under the old configuration are synchronized first; the
    /// accrued balance is then clamped to the new ceiling.
    pub fn update_rate(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        id: ChannelId,
        new_rate: Amount,
        new_cap: Amount,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            if new_rate.is_zero() || new_cap.is_zero() {
                return Err(FlowError::BadParameters(
                    "rate and ceiling must be positive".to_string(),
                ));
            }
            let key = entry_key(&id);
            let mut record = self.granted_entry(state, ctx, &key)?;
            sync(&mut record, ctx.now);
            let old_rate = record.rate_per_second;
            let old_cap = record.max_balance;
            record.rate_per_second = new_rate;
            record.max_balance = new_cap;
            record.accrued = record.accrued.min(new_cap);
            store_typed(state, &key, &record)?;
            journal::emit(
                state,
                ctx,
                KernelEvent::ChannelRateUpdated {
                    id,
                    old_rate,
                    old_cap,
                    new_rate,
                    new_cap,
                },
            )
        })
    }

    /// The balance a pull could take right now. A pure projection of the
    /// stored record at `now`; never mutates.
    pub fn claimable(
        &self,
        state: &dyn StateAccess,
        id: ChannelId,
        now: u64,
    ) -> Result<Amount, FlowError> {
        let record: ChannelRecord =
            load_typed(state, &entry_key(&id))?.ok_or(FlowError::BadId)?;
        if record.paused || record.revoked {
            return Ok(record.accrued);
        }
        let mut projected = record;
        sync(&mut projected, now);
        Ok(projected.accrued)
    }

    /// The stored record for `id`, if any.
    pub fn channel_of(
        &self,
        state: &dyn StateAccess,
        id: ChannelId,
    ) -> Result<Option<ChannelRecord>, FlowError> {
        load_typed(state, &entry_key(&id))
    }

    fn granted_entry(
        &self,
        state: &dyn StateAccess,
        ctx: &CallContext,
        key: &[u8],
    ) -> Result<ChannelRecord, FlowError> {
        let record: ChannelRecord = load_typed(state, key)?.ok_or(FlowError::BadId)?;
        if record.grantor != ctx.caller {
            return Err(FlowError::NotGrantor);
        }
        Ok(record)
    }
}

/// Advances `record` to `now`. No accrual while paused or revoked; the
/// elapsed window is consumed either way, so it never banks.
fn sync(record: &mut ChannelRecord, now: u64) {
    let dt = now.saturating_sub(record.last_update);
    if dt == 0 {
        return;
    }
    record.last_update = now;
    if record.revoked || record.paused {
        return;
    }
    let earned = record
        .rate_per_second
        .checked_mul_u64(dt)
        .unwrap_or(Amount::MAX);
    record.accrued = record
        .accrued
        .saturating_add(earned)
        .min(record.max_balance);
}
