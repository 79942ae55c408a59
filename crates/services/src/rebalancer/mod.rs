// Path: crates/services/src/rebalancer/mod.rs

//! The cross-domain rebalancer.
//!
//! Orchestrates one intent-backed move: caller and domain policy are
//! checked first (cheap, no state), the lower-level pull authority is
//! confirmed live, the intent budget is reserved atomically in the
//! registry, and only then does the external adapter pull run. A failure
//! anywhere unwinds everything, including the reservation.

use crate::consent::ConsentRegistry;
use crate::directory::DomainDirectory;
use crate::intent::IntentRegistry;
use crate::journal;
use crate::support::{load_typed, store_typed};
use siphon_api::account::AccountDirectory;
use siphon_api::adapter::SourceAdapter;
use siphon_api::context::CallContext;
use siphon_api::state::{run_atomic, StateAccess};
use siphon_types::consent::FlowIntentEnvelope;
use siphon_types::error::FlowError;
use siphon_types::events::KernelEvent;
use siphon_types::primitives::{Address, Amount, IntentHash};


const CONTROLLER_KEY: &[u8] = b"rebalancer::controller";

/// The rebalancer component.
pub struct Rebalancer<A> {
    address: Address,
    intents: IntentRegistry<A>,
    directory: DomainDirectory,
    consents: ConsentRegistry,
}

impl<A: AccountDirectory> Rebalancer<A> {
    /// Builds a rebalancer at `address` over its intent registry and
    /// domain directory. The intent registry's controller must be this
    /// address for consumes to pass.
    pub fn new(address: Address, intents: IntentRegistry<A>) -> Self {
        Self {
            address,
            intents,
            directory: DomainDirectory,
            consents: ConsentRegistry,
        }
    }

    /// The rebalancer's component address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The intent registry this rebalancer consumes through.
    pub fn intents(&self) -> &IntentRegistry<A> {
        &self.intents
    }

    /// Binds the governance controller to the caller. One-shot.
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

    /// Executes one cross-domain move of `amount` under `envelope`
    /// through `adapter`. Returns the consumed intent's hash.
    pub fn execute_flow_intent(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        envelope: &FlowIntentEnvelope,
        amount: Amount,
        adapter: &dyn SourceAdapter,
    ) -> Result<IntentHash, FlowError> {
        let intent = &envelope.intent;
        run_atomic(state, |state| {
            if amount.is_zero() {
                return Err(FlowError::AmountZero);
            }
            if adapter.address().is_zero() {
                return Err(FlowError::BadAddress);
            }

            let controller: Option<Address> = load_typed(state, CONTROLLER_KEY)?;
            if ctx.caller != intent.executor && Some(ctx.caller) != controller {
                return Err(FlowError::NotAuthorizedCaller);
            }

            if !self
                .directory
                .is_approved_executor(state, intent.src_domain, intent.executor)?
            {
                return Err(FlowError::ExecutorForbidden);
            }
            if !self
                .directory
                .is_approved_executor(state, intent.dst_domain, intent.executor)?
            {
                return Err(FlowError::ExecutorForbidden);
            }

            if self.consents.is_revoked(state, envelope.auth_hash)? {
                return Err(FlowError::Revoked);
            }
            let right = adapter
                .right_of(state, envelope.auth_hash)?
                .ok_or(FlowError::UnknownAuthorization)?;
            if right.grantor != intent.grantor {
                return Err(FlowError::GrantorMismatch);
            }
            if right.token != intent.token {
                return Err(FlowError::TokenMismatch);
            }

            let inner = ctx.reframe(self.address);
            let hash = self.intents.verify_and_consume(
                state,
                &inner,
                intent,
                &envelope.signature,
                amount,
            )?;

            let destination = self
                .directory
                .receiver_of(state, intent.dst_domain)?
                .filter(|d| !d.is_zero())
                .ok_or(FlowError::NoDstReceiver)?;

            adapter.pull(state, &inner, envelope.auth_hash, destination, amount)?;

            journal::emit(
                state,
                ctx,
                KernelEvent::RebalanceExecuted {
                    intent_hash: hash,
                    src_domain: intent.src_domain,
                    dst_domain: intent.dst_domain,
                    token: intent.token,
                    amount,
                    executor: intent.executor,
                },
            )?;
            log::info!(
                "rebalancer: moved {} under {} from {} to {}",
                amount,
                hash,
                intent.src_domain,
                intent.dst_domain
            );
            Ok(hash)
        })
    }
}
