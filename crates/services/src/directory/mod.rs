// Path: crates/services/src/directory/mod.rs

//! The domain directory of the cross-domain plane.
//!
//! Controller-curated mapping from a domain id to its adapter, its
//! destination receiver, and its per-executor approvals. A domain is
//! routable for an executor iff the domain is active and the executor is
//! approved in it.

use crate::journal;
use crate::support::{load_typed, store_typed};
use siphon_api::context::CallContext;
use siphon_api::state::{run_atomic, StateAccess};
use siphon_types::error::FlowError;
use siphon_types::events::KernelEvent;
use siphon_types::primitives::{Address, DomainId};
use siphon_types::records::DomainRecord;


const CONTROLLER_KEY: &[u8] = b"directory::controller";
const DOMAIN_PREFIX: &[u8] = b"directory::domain::";
const APPROVAL_PREFIX: &[u8] = b"directory::approval::";

fn domain_key(id: &DomainId) -> Vec<u8> {
    [DOMAIN_PREFIX, id.as_ref()].concat()
}

fn approval_key(id: &DomainId, executor: &Address) -> Vec<u8> {
    [APPROVAL_PREFIX, id.as_ref(), b"::", executor.as_ref()].concat()
}

/// The domain-directory component.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainDirectory;

impl DomainDirectory {
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

    /// Configures a domain. Controller-only. An active domain must carry
    /// real adapter and destination addresses; deactivation may keep them.
    pub fn set_domain(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        id: DomainId,
        adapter: Address,
        destination: Address,
        active: bool,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            self.require_controller(state, ctx)?;
            if active && (adapter.is_zero() || destination.is_zero()) {
                return Err(FlowError::BadAddress);
            }
            let record = DomainRecord {
                adapter,
                destination,
                active,
            };
            store_typed(state, &domain_key(&id), &record)?;
            journal::emit(
                state,
                ctx,
                KernelEvent::DomainConfigured {
                    domain_id: id,
                    adapter,
                    destination,
                    active,
                },
            )?;
            log::info!(
                "directory: domain {} -> adapter 0x{}, destination 0x{}, active {}",
                id,
                hex::encode(adapter),
                hex::encode(destination),
                active
            );
            Ok(())
        })
    }

    /// Approves or disapproves an executor in a domain. Controller-only.
    pub fn set_executor_approval(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        id: DomainId,
        executor: Address,
        approved: bool,
    ) -> Result<(), FlowError> {
        run_atomic(state, |state| {
            self.require_controller(state, ctx)?;
            if executor.is_zero() {
                return Err(FlowError::BadAddress);
            }
            store_typed(state, &approval_key(&id, &executor), &approved)?;
            journal::emit(
                state,
                ctx,
                KernelEvent::ExecutorApprovalSet {
                    domain_id: id,
                    executor,
                    approved,
                },
            )
        })
    }

    /// Whether `executor` may operate in `id`: the domain is active and
    /// the executor approved.
    pub fn is_approved_executor(
        &self,
        state: &dyn StateAccess,
        id: DomainId,
        executor: Address,
    ) -> Result<bool, FlowError> {
        let Some(record) = self.domain_of(state, id)? else {
            return Ok(false);
        };
        if !record.active {
            return Ok(false);
        }
        Ok(load_typed(state, &approval_key(&id, &executor))?.unwrap_or(false))
    }

    /// The destination receiver of `id`, if the domain is configured.
    pub fn receiver_of(
        &self,
        state: &dyn StateAccess,
        id: DomainId,
    ) -> Result<Option<Address>, FlowError> {
        Ok(self.domain_of(state, id)?.map(|r| r.destination))
    }

    /// The adapter bound to `id`, if the domain is configured.
    pub fn adapter_of(
        &self,
        state: &dyn StateAccess,
        id: DomainId,
    ) -> Result<Option<Address>, FlowError> {
        Ok(self.domain_of(state, id)?.map(|r| r.adapter))
    }

    /// The stored record for `id`, if any.
    pub fn domain_of(
        &self,
        state: &dyn StateAccess,
        id: DomainId,
    ) -> Result<Option<DomainRecord>, FlowError> {
        load_typed(state, &domain_key(&id))
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
