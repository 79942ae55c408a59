// Path: crates/services/src/mesh/mod.rs

//! The settlement mesh.
//!
//! An underweight-first allocator over controller-reported balances: each
//! tick computes every active destination's deficit against its
//! basis-point target of the reported total, picks the deepest deficit,
//! and drives one bounded routing step toward it. The mesh mutates none
//! of its own accounting after the router call, so a reentrant callback
//! cannot corrupt it, and repeated ticks over the same reports converge
//! to a no-op. Target shares are intentionally unconstrained in sum;
//! over- and under-allocation are permitted configurations.

use crate::journal;
use crate::router::AdaptiveRouter;
use crate::support::{load_typed, store_typed};
use siphon_api::context::CallContext;
use siphon_api::state::{run_atomic, StateAccess};
use siphon_api::token::TokenLedger;
use siphon_types::error::FlowError;
use siphon_types::events::KernelEvent;
use siphon_types::primitives::{Address, Amount};
use siphon_types::records::DestinationTarget;

#[cfg(test)]
mod tests;

const CONTROLLER_KEY: &[u8] = b"mesh::controller";
const ORDER_KEY: &[u8] = b"mesh::order";
const DEST_PREFIX: &[u8] = b"mesh::dest::";
const BALANCE_PREFIX: &[u8] = b"mesh::balance::";
const TOTAL_KEY: &[u8] = b"mesh::total";

/// Full allocation, in basis points.
const BPS_SCALE: u64 = 10_000;

fn dest_key(dest: &Address) -> Vec<u8> {
    [DEST_PREFIX, dest.as_ref()].concat()
}

fn balance_key(dest: &Address) -> Vec<u8> {
    [BALANCE_PREFIX, dest.as_ref()].concat()
}

/// The settlement-mesh component.
pub struct SettlementMesh<L> {
    address: Address,
    router: AdaptiveRouter<L>,
}

impl<L: TokenLedger> SettlementMesh<L> {
    /// Builds a mesh at `address` over the router it drives. The router's
    /// controller must be this address for ticks to pass.
    pub fn new(address: Address, router: AdaptiveRouter<L>) -> Self {
        Self { address, router }
    }

    /// The mesh's component address.
    pub fn address(&self) -> Address {
        self.address
    }

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

    /// Configures a destination's target share. Controller-only. New
    /// destinations keep their configuration order for tie breaks.
    pub fn configure_destination(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        destination: Address,
        target_bps: u16,
        active: bool,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            self.require_controller(state, ctx)?;
            if destination.is_zero() {
                return Err(FlowError::BadAddress);
            }
            if u64::from(target_bps) > BPS_SCALE {
                return Err(FlowError::BadParameters(
                    "target_bps above full allocation".to_string(),
                ));
            }
            let key = dest_key(&destination);
            if state.get(&key)?.is_none() {
                let mut order: Vec<Address> = load_typed(state, ORDER_KEY)?.unwrap_or_default();
                order.push(destination);
                store_typed(state, ORDER_KEY, &order)?;
            }
            store_typed(state, &key, &DestinationTarget { target_bps, active })?;
            journal::emit(
                state,
                ctx,
                KernelEvent::DestinationConfigured {
                    destination,
                    target_bps,
                    active,
                },
            )
        })
    }

    /// Reports an observed balance for a destination together with the
    /// observed total. Controller-only; reporting is idempotent.
    pub fn report(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        destination: Address,
        balance: Amount,
        total: Amount,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            self.require_controller(state, ctx)?;
            if state.get(&dest_key(&destination))?.is_none() {
                return Err(FlowError::BadId);
            }
            store_typed(state, &balance_key(&destination), &balance)?;
            store_typed(state, TOTAL_KEY, &total)?;
            journal::emit(
                state,
                ctx,
                KernelEvent::BalanceReported {
                    destination,
                    balance,
                    total,
                },
            )
        })
    }

    /// Drives one allocation step, bounded by `max_step_amount`.
    ///
    /// Picks the active destination with the deepest deficit against its
    /// target share (ties: first configured) and routes toward it.
    /// Returns the chosen destination and the requested step, or `None`
    /// when every destination is at or above target.
    pub fn rebalance_tick(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        max_step_amount: Amount,
    ) -> Result<Option<(Address, Amount)>, FlowError> {
        run_atomic(state, |state| {
            self.require_controller(state, ctx)?;

            let total: Amount = load_typed(state, TOTAL_KEY)?.unwrap_or(Amount::ZERO);
            if total.is_zero() {
                return Ok(None);
            }

            let order: Vec<Address> = load_typed(state, ORDER_KEY)?.unwrap_or_default();
            let mut worst: Option<(Address, Amount)> = None;
            for destination in order {
                let Some(target) =
                    load_typed::<DestinationTarget>(state, &dest_key(&destination))?
                else {
                    continue;
                };
                if !target.active || target.target_bps == 0 {
                    continue;
                }
                let want = total
                    .checked_mul_u64(u64::from(target.target_bps))
                    .and_then(|w| w.checked_div_u64(BPS_SCALE))
                    .ok_or(FlowError::ArithmeticOverflow)?;
                let balance: Amount =
                    load_typed(state, &balance_key(&destination))?.unwrap_or(Amount::ZERO);
                let deficit = want.saturating_sub(balance);
                if deficit.is_zero() {
                    continue;
                }
                // Strict comparison keeps the first-configured destination
                // on ties.
                if worst.map(|(_, d)| deficit > d).unwrap_or(true) {
                    worst = Some((destination, deficit));
                }
            }
            let Some((destination, deficit)) = worst else {
                return Ok(None);
            };

            let step = deficit.min(max_step_amount);
            self.router
                .route_step(state, &ctx.reframe(self.address), destination, step)?;
            journal::emit(
                state,
                ctx,
                KernelEvent::MeshStep {
                    dest: destination,
                    deficit,
                    sent: step,
                },
            )?;
            log::debug!(
                "mesh: stepped {} toward 0x{} (deficit {})",
                step,
                hex::encode(destination),
                deficit
            );
            Ok(Some((destination, step)))
        })
    }

    /// The router this mesh drives.
    pub fn router(&self) -> &AdaptiveRouter<L> {
        &self.router
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
