// Path: crates/services/src/router/mod.rs

//! The adaptive router.
//!
//! Holds a weighted set of flow channels and, per routing step, drains
//! the heaviest active one toward a receiver. Failures from the selected
//! channel propagate loudly so governance sees a policy block instead of
//! a silent fallback, and a zero-amount step still emits its telemetry
//! event.

use crate::channel::FlowChannel;
use crate::journal;
use crate::support::{load_typed, store_typed};
use siphon_api::context::CallContext;
use siphon_api::state::{run_atomic, StateAccess};
use siphon_api::token::TokenLedger;
use siphon_types::error::FlowError;
use siphon_types::events::KernelEvent;
use siphon_types::primitives::{Address, Amount, ChannelId};
use siphon_types::records::RouteTarget;


const CONTROLLER_KEY: &[u8] = b"router::controller";
const ORDER_KEY: &[u8] = b"router::order";
const TARGET_PREFIX: &[u8] = b"router::target::";

fn target_key(id: &ChannelId) -> Vec<u8> {
    [TARGET_PREFIX, id.as_ref()].concat()
}

/// The adaptive-router component.
pub struct AdaptiveRouter<L> {
    address: Address,
    channels: FlowChannel<L>,
}

impl<L: TokenLedger> AdaptiveRouter<L> {
    /// Builds a router at `address` over the flow-channel component. The
    /// router address must be the grantee of every channel it drains.
    pub fn new(address: Address, channels: FlowChannel<L>) -> Self {
        Self { address, channels }
    }

    /// The router's component address.
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

    /// Rotates the controller. Controller-only. The settlement mesh is
    /// the expected long-run controller.
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

    /// Registers a channel as a route target. Controller-only; ids are
    /// first-come-first-served and keep their registration order for tie
    /// breaks.
    pub fn register_channel(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        id: ChannelId,
        weight: u64,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            self.require_controller(state, ctx)?;
            if id.is_zero() {
                return Err(FlowError::BadId);
            }
            let key = target_key(&id);
            if state.get(&key)?.is_some() {
                return Err(FlowError::BadId);
            }
            let mut order: Vec<ChannelId> = load_typed(state, ORDER_KEY)?.unwrap_or_default();
            order.push(id);
            store_typed(state, ORDER_KEY, &order)?;
            store_typed(
                state,
                &key,
                &RouteTarget {
                    weight,
                    active: true,
                },
            )?;
            journal::emit(
                state,
                ctx,
                KernelEvent::ChannelRegistered {
                    channel_id: id,
                    weight,
                },
            )
        })
    }

    /// Updates a registered target's weight and activity. Controller-only.
    pub fn update_channel(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        id: ChannelId,
        weight: u64,
        active: bool,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            self.require_controller(state, ctx)?;
            let key = target_key(&id);
            if state.get(&key)?.is_none() {
                return Err(FlowError::BadId);
            }
            store_typed(state, &key, &RouteTarget { weight, active })?;
            journal::emit(
                state,
                ctx,
                KernelEvent::ChannelUpdated {
                    channel_id: id,
                    weight,
                    active,
                },
            )
        })
    }

    /// Drives one routing step: drains up to `max_desired` from the
    /// heaviest active channel toward `to`. Returns the routed amount,
    /// which is zero when the best channel has nothing claimable.
    pub fn route_step(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        to: Address,
        max_desired: Amount,
    ) -> Result<Amount, FlowError> {
        run_atomic(state, |state| {
            self.require_controller(state, ctx)?;

            let order: Vec<ChannelId> = load_typed(state, ORDER_KEY)?.unwrap_or_default();
            let mut best: Option<(ChannelId, u64)> = None;
            for id in order {
                let Some(target) = load_typed::<RouteTarget>(state, &target_key(&id))? else {
                    continue;
                };
                if !target.active {
                    continue;
                }
                // Strict comparison keeps the first-registered channel on
                // ties.
                if best.map(|(_, w)| target.weight > w).unwrap_or(true) {
                    best = Some((id, target.weight));
                }
            }
            let (best, _) = best.ok_or(FlowError::NoActiveRoute)?;

            let claimable = self.channels.claimable(state, best, ctx.now)?;
            let amount = claimable.min(max_desired);
            if !amount.is_zero() {
                self.channels
                    .pull(state, &ctx.reframe(self.address), best, to, amount)?;
            }
            journal::emit(
                state,
                ctx,
                KernelEvent::Routed {
                    channel_id: best,
                    to,
                    amount,
                },
            )?;
            log::debug!("router: routed {} from {} to 0x{}", amount, best, hex::encode(to));
            Ok(amount)
        })
    }

    /// The stored target for `id`, if registered.
    pub fn target_of(
        &self,
        state: &dyn StateAccess,
        id: ChannelId,
    ) -> Result<Option<RouteTarget>, FlowError> {
        load_typed(state, &target_key(&id))
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
