// Path: crates/services/src/intent/mod.rs

//! The cross-domain intent registry.
//!
//! Verifies signed flow intents and meters their cumulative budget. The
//! consume path is controller-only (the rebalancer, or its governance
//! proxy): budget is reserved here, atomically, before any external
//! transfer is attempted downstream, so a failure or reentrant callback
//! can never overspend an intent. Owners revoke their own intents
//! directly.

use crate::journal;
use crate::support::{acquire_latch, load_typed, release_latch, store_typed};
use siphon_api::account::AccountDirectory;
use siphon_api::context::CallContext;
use siphon_api::state::{run_atomic, StateAccess};
use siphon_crypto::domain::SigningDomain;
use siphon_crypto::typed::intent_hash;
use siphon_crypto::verify::verify_account_signature;
use siphon_types::consent::FlowIntent;
use siphon_types::error::FlowError;
use siphon_types::events::KernelEvent;
use siphon_types::primitives::{Address, Amount, IntentHash};
use siphon_types::records::IntentRecord;


const DOMAIN_NAME: &str = "siphon.intent-registry";
const DOMAIN_VERSION: &str = "1";

const CONTROLLER_KEY: &[u8] = b"intent::controller";
const ENTRY_PREFIX: &[u8] = b"intent::entry::";
const CONSUME_LATCH_KEY: &[u8] = b"intent::consume_lock";

fn entry_key(hash: &IntentHash) -> Vec<u8> {
    [ENTRY_PREFIX, hash.as_ref()].concat()
}

/// The intent-registry component.
pub struct IntentRegistry<A> {
    domain: SigningDomain,
    accounts: A,
}

impl<A: AccountDirectory> IntentRegistry<A> {
    /// Builds a registry instance; the signing domain binds every intent
    /// signature to this instance address and host.
    pub fn new(address: Address, host_id: u64, accounts: A) -> Self {
        Self {
            domain: SigningDomain::new(DOMAIN_NAME, DOMAIN_VERSION, host_id, address),
            accounts,
        }
    }

    /// The registry's signing domain, as wallets must reproduce it.
    pub fn domain(&self) -> &SigningDomain {
        &self.domain
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

    /// Verifies `intent` and reserves `amount` of its budget.
    ///
    /// Controller-only. On success the reservation is already committed
    /// into `moved_so_far` and the entry's owner is bound; the returned
    /// hash names the entry.
    pub fn verify_and_consume(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        intent: &FlowIntent,
        signature: &[u8],
        amount: Amount,
    ) -> Result<IntentHash, FlowError> {
        run_atomic(state, |state| {
            self.require_controller(state, ctx)?;
            acquire_latch(state, CONSUME_LATCH_KEY)?;

            if amount.is_zero() {
                return Err(FlowError::AmountZero);
            }
            if ctx.now < intent.valid_after {
                return Err(FlowError::TooSoon);
            }
            if ctx.now > intent.valid_before {
                return Err(FlowError::Expired);
            }

            let hash = intent_hash(intent);
            let key = entry_key(&hash);
            let mut record: IntentRecord = load_typed(state, &key)?.unwrap_or_default();
            if record.revoked {
                return Err(FlowError::Revoked);
            }

            let moved = record
                .moved_so_far
                .checked_add(amount)
                .ok_or(FlowError::ArithmeticOverflow)?;
            if moved > intent.max_total {
                return Err(FlowError::CapExceeded);
            }

            let digest = self.domain.typed_digest(hash.0);
            verify_account_signature(&self.accounts, intent.grantor, digest, signature)?;

            match record.owner {
                None => record.owner = Some(intent.grantor),
                Some(owner) if owner != intent.grantor => {
                    return Err(FlowError::GrantorMismatch)
                }
                Some(_) => {}
            }
            record.moved_so_far = moved;
            store_typed(state, &key, &record)?;
            log::info!(
                "intent: reserved {} under {} (moved {})",
                amount,
                hash,
                moved
            );
            release_latch(state, CONSUME_LATCH_KEY)?;
            Ok(hash)
        })
    }

    /// Revokes the intent. Owner-only; one-way.
    pub fn revoke_intent(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        hash: IntentHash,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            let key = entry_key(&hash);
            let mut record: IntentRecord =
                load_typed(state, &key)?.ok_or(FlowError::UnknownIntent)?;
            let owner = record.owner.ok_or(FlowError::UnknownIntent)?;
            if owner != ctx.caller {
                return Err(FlowError::NotOwner);
            }
            if record.revoked {
                return Err(FlowError::Revoked);
            }
            record.revoked = true;
            store_typed(state, &key, &record)?;
            journal::emit(
                state,
                ctx,
                KernelEvent::IntentRevoked {
                    intent_hash: hash,
                    owner,
                    ts: ctx.now,
                },
            )
        })
    }

    /// Whether `hash` has been revoked.
    pub fn is_revoked(&self, state: &dyn StateAccess, hash: IntentHash) -> Result<bool, FlowError> {
        Ok(load_typed::<IntentRecord>(state, &entry_key(&hash))?
            .map(|r| r.revoked)
            .unwrap_or(false))
    }

    /// Cumulative consumed amount under `hash`.
    pub fn moved_so_far(
        &self,
        state: &dyn StateAccess,
        hash: IntentHash,
    ) -> Result<Amount, FlowError> {
        Ok(load_typed::<IntentRecord>(state, &entry_key(&hash))?
            .map(|r| r.moved_so_far)
            .unwrap_or(Amount::ZERO))
    }

    /// The bound owner of `hash`, if any consume has succeeded.
    pub fn owner_of_intent(
        &self,
        state: &dyn StateAccess,
        hash: IntentHash,
    ) -> Result<Option<Address>, FlowError> {
        Ok(load_typed::<IntentRecord>(state, &entry_key(&hash))?.and_then(|r| r.owner))
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
