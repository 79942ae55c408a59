// Path: crates/api/src/account.rs
//! Verification hooks for code-bearing grantor accounts.
//!
//! A grantor may be a programmable account that signs through its own
//! verification logic instead of holding a recoverable key. The kernel
//! probes the host for such a hook on every signature check and, when one
//! exists, honors its decision; only hook-less accounts fall back to
//! ECDSA recovery.

use siphon_types::error::FlowError;
use siphon_types::primitives::Address;

/// The fixed acceptance tag a code-bearing account's hook must return for
/// a signature it considers valid. Any other value is a rejection.
pub const CODE_ACCEPTANCE_MAGIC: [u8; 4] = [0x1f, 0x9a, 0x7c, 0x41];

/// The verification hook declared by one code-bearing account.
pub trait CodeVerifier {
    /// Evaluates `signature` over `digest`; returns the account's
    /// acceptance tag. Accept the signature iff the tag equals
    /// [`CODE_ACCEPTANCE_MAGIC`].
    fn verify(&self, digest: [u8; 32], signature: &[u8]) -> Result<[u8; 4], FlowError>;
}

/// Host-side resolution from account address to verification hook.
pub trait AccountDirectory {
    /// Returns the verification hook for `account` if it is code-bearing,
    /// `None` for plain key-holder accounts.
    fn code_verifier(&self, account: Address) -> Option<&dyn CodeVerifier>;
}

/// An [`AccountDirectory`] for hosts where every account is a plain
/// key-holder: the probe always comes back empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyholderOnly;

impl AccountDirectory for KeyholderOnly {
    fn code_verifier(&self, _account: Address) -> Option<&dyn CodeVerifier> {
        None
    }
}
