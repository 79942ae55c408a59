// Path: crates/api/src/context.rs
//! The stable context for kernel operation execution.

use siphon_types::primitives::Address;

/// Provides stable, read-only context to kernel components during one
/// operation.
///
/// The host linearizes calls, so a single context describes the whole
/// operation: who initiated it and at what host time. When a component
/// calls a downstream component on its own authority, it reframes the
/// context with its own address as the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// The principal this call runs as. The authoritative source for
    /// permission checks within components.
    pub caller: Address,
    /// Host-provided timestamp in seconds. Monotone non-decreasing across
    /// operations.
    pub now: u64,
}

impl CallContext {
    /// Builds a context for an externally initiated operation.
    pub fn new(caller: Address, now: u64) -> Self {
        Self { caller, now }
    }

    /// Derives the context for a downward call made on a component's own
    /// authority: same host time, the component as caller.
    pub fn reframe(&self, component: Address) -> Self {
        Self {
            caller: component,
            now: self.now,
        }
    }
}
