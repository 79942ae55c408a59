// Path: crates/api/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
//! # siphon API
//!
//! Core traits and host interfaces for the siphon kernel. This crate
//! defines the stable contract between the kernel components and the host
//! embedding them: the keyed state store, the call context, the external
//! token ledger, the code-bearing-account verification hook, and the
//! source-adapter boundary of the cross-domain plane.

pub mod account;
pub mod adapter;
pub mod context;
pub mod state;
pub mod token;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::account::{AccountDirectory, CodeVerifier, KeyholderOnly};
    pub use crate::adapter::SourceAdapter;
    pub use crate::context::CallContext;
    pub use crate::state::{run_atomic, MemoryState, StateAccess, StateOverlay};
    pub use crate::token::TokenLedger;
}
