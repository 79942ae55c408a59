// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! Core data structures, identifiers, and error types for the siphon kernel.
//!
//! Everything that crosses a component boundary lives here: the primitive
//! newtypes (`Address`, `Amount`, the 32-byte object ids), the signed
//! consent payloads, the stored per-component records, the kernel event
//! enum, and the error taxonomy. All stored types carry both SCALE codec
//! derives (canonical state encoding) and serde derives (tooling and
//! inspection surfaces).

pub mod codec;
pub mod consent;
pub mod error;
pub mod events;
pub mod primitives;
pub mod records;

#[cfg(test)]
mod events_tests;

pub use consent::{Authorization, FlowIntent, FlowIntentEnvelope, SignedAuthorization};
pub use error::{FlowError, StateError};
pub use events::KernelEvent;
pub use primitives::{Address, Amount, AuthHash, ChannelId, DomainId, IntentHash, PolicyId};
