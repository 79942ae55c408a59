// Path: crates/crypto/src/lib.rs
#![forbid(unsafe_code)]

//! Typed-payload hashing and signature verification for the siphon kernel.
//!
//! Signed consent objects are reduced to a canonical struct hash, bound to
//! a specific verifying instance through a domain descriptor, and verified
//! along one of two paths: a code-bearing account's own verification hook,
//! or ECDSA recovery with low-`s` enforcement for key-holder accounts.

pub mod domain;
pub mod ecdsa;
pub mod hash;
pub mod signer;
pub mod typed;
pub mod verify;

pub use domain::SigningDomain;
pub use signer::LocalSigner;
pub use typed::{auth_hash, intent_hash};
pub use verify::verify_account_signature;
