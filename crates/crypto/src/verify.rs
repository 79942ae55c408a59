// Path: crates/crypto/src/verify.rs

//! Dual-path signature verification.
//!
//! Every consent signature is checked the same way: probe the host for a
//! code-bearing verification hook on the signer and honor its decision;
//! only hook-less accounts fall back to ECDSA recovery. There is no
//! configuration that skips the probe.

use crate::ecdsa::recover_signer;
use siphon_api::account::{AccountDirectory, CODE_ACCEPTANCE_MAGIC};
use siphon_types::error::FlowError;
use siphon_types::primitives::Address;

/// Verifies that `signature` authorizes `digest` on behalf of `signer`.
///
/// Code-bearing path: the account's hook must return the protocol
/// acceptance magic. Key-holder path: the recovered address must equal
/// `signer`, with `v` and low-`s` rules enforced by recovery.
pub fn verify_account_signature(
    accounts: &dyn AccountDirectory,
    signer: Address,
    digest: [u8; 32],
    signature: &[u8],
) -> Result<(), FlowError> {
    if let Some(hook) = accounts.code_verifier(signer) {
        let magic = hook.verify(digest, signature)?;
        if magic != CODE_ACCEPTANCE_MAGIC {
            return Err(FlowError::BadSignature(
                "code account rejected signature".to_string(),
            ));
        }
        return Ok(());
    }

    let recovered = recover_signer(digest, signature)?;
    if recovered != signer {
        return Err(FlowError::BadSignature(format!(
            "recovered {recovered}, expected {signer}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::LocalSigner;
    use siphon_api::account::{CodeVerifier, KeyholderOnly};

    struct FixedVerifier([u8; 4]);

    impl CodeVerifier for FixedVerifier {
        fn verify(&self, _digest: [u8; 32], _signature: &[u8]) -> Result<[u8; 4], FlowError> {
            Ok(self.0)
        }
    }

    struct SingleHook {
        account: Address,
        verifier: FixedVerifier,
    }

    impl AccountDirectory for SingleHook {
        fn code_verifier(&self, account: Address) -> Option<&dyn CodeVerifier> {
            (account == self.account).then_some(&self.verifier as &dyn CodeVerifier)
        }
    }

    #[test]
    fn key_holder_path_checks_recovered_address() {
        let signer = LocalSigner::from_seed([0x11; 32]);
        let digest = [3u8; 32];
        let signature = signer.sign_digest(digest).expect("sign");

        verify_account_signature(&KeyholderOnly, signer.address(), digest, &signature)
            .expect("own signature verifies");
        assert!(verify_account_signature(
            &KeyholderOnly,
            Address([0x99; 20]),
            digest,
            &signature
        )
        .is_err());
    }

    #[test]
    fn code_path_requires_the_acceptance_magic() {
        let account = Address([0x22; 20]);
        let accepting = SingleHook {
            account,
            verifier: FixedVerifier(CODE_ACCEPTANCE_MAGIC),
        };
        let rejecting = SingleHook {
            account,
            verifier: FixedVerifier([0u8; 4]),
        };

        // The code path never consults ECDSA, so garbage bytes pass the
        // accepting hook and fail the rejecting one.
        verify_account_signature(&accepting, account, [0u8; 32], b"opaque").expect("magic accepted");
        assert!(verify_account_signature(&rejecting, account, [0u8; 32], b"opaque").is_err());
    }
}
