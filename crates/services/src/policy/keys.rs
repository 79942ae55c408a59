// Path: crates/services/src/policy/keys.rs

use siphon_types::primitives::{Address, PolicyId};

pub(super) const ENTRY_PREFIX: &[u8] = b"policy::entry::";
pub(super) const ALLOW_PREFIX: &[u8] = b"policy::allow::";
pub(super) const CONSUME_LATCH_KEY: &[u8] = b"policy::consume_lock";

pub(super) fn entry_key(policy_id: &PolicyId) -> Vec<u8> {
    [ENTRY_PREFIX, policy_id.as_ref()].concat()
}

pub(super) fn allow_key(policy_id: &PolicyId, receiver: &Address) -> Vec<u8> {
    [ALLOW_PREFIX, policy_id.as_ref(), b"::", receiver.as_ref()].concat()
}
