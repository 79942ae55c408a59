// Path: crates/services/src/channel/keys.rs

use siphon_types::primitives::ChannelId;

pub(super) const ENTRY_PREFIX: &[u8] = b"channel::entry::";
pub(super) const LATCH_PREFIX: &[u8] = b"channel::lock::";

pub(super) fn entry_key(id: &ChannelId) -> Vec<u8> {
    [ENTRY_PREFIX, id.as_ref()].concat()
}

pub(super) fn latch_key(id: &ChannelId) -> Vec<u8> {
    [LATCH_PREFIX, id.as_ref()].concat()
}
