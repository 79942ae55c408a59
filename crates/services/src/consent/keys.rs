// Path: crates/services/src/consent/keys.rs

use siphon_types::primitives::{Address, AuthHash};

pub(super) const CONTROLLER_KEY: &[u8] = b"consent::controller";
pub(super) const ENTRY_PREFIX: &[u8] = b"consent::entry::";
pub(super) const TRUSTED_PREFIX: &[u8] = b"consent::trusted::";
pub(super) const RECORD_LATCH_KEY: &[u8] = b"consent::record_lock";

pub(super) fn entry_key(auth_hash: &AuthHash) -> Vec<u8> {
    [ENTRY_PREFIX, auth_hash.as_ref()].concat()
}

pub(super) fn trusted_key(executor: &Address) -> Vec<u8> {
    [TRUSTED_PREFIX, executor.as_ref()].concat()
}
