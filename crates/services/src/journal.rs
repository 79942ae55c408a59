// Path: crates/services/src/journal.rs

//! The hash-chained kernel event journal.
//!
//! Every state-changing operation appends its events here; indexers tail
//! the sequence and can verify the chain head against any replica. Journal
//! writes ride the same atomic overlay as the operation that produced
//! them, so a failed operation leaves no events behind.

use crate::support::{load_typed, store_typed};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use siphon_api::context::CallContext;
use siphon_api::state::StateAccess;
use siphon_crypto::hash::keccak256;
use siphon_types::codec;
use siphon_types::error::FlowError;
use siphon_types::events::KernelEvent;

const ENTRY_PREFIX: &[u8] = b"journal::entry::";
const NEXT_SEQ_KEY: &[u8] = b"journal::next_seq";
const HEAD_KEY: &[u8] = b"journal::head";

/// One journal row.
#[derive(Encode, Decode, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    /// Position in the journal, starting at 0.
    pub seq: u64,
    /// Host timestamp the producing operation ran at.
    pub ts: u64,
    /// The event itself.
    pub event: KernelEvent,
    /// Chain commitment: `keccak256(prev_head || seq || ts || event)`.
    pub event_hash: [u8; 32],
}

fn entry_key(seq: u64) -> Vec<u8> {
    [ENTRY_PREFIX, &seq.to_be_bytes()].concat()
}

/// Appends `event` to the journal.
pub fn emit(
    state: &mut dyn StateAccess,
    ctx: &CallContext,
    event: KernelEvent,
) -> Result<(), FlowError> {
    let seq: u64 = load_typed(state, NEXT_SEQ_KEY)?.unwrap_or(0);
    let prev_head: [u8; 32] = load_typed(state, HEAD_KEY)?.unwrap_or([0u8; 32]);

    let mut material = Vec::with_capacity(32 + 8 + 8);
    material.extend_from_slice(&prev_head);
    material.extend_from_slice(&seq.to_be_bytes());
    material.extend_from_slice(&ctx.now.to_be_bytes());
    material.extend_from_slice(&codec::to_bytes_canonical(&event));
    let event_hash = keccak256(&material);

    let entry = JournalEntry {
        seq,
        ts: ctx.now,
        event,
        event_hash,
    };
    store_typed(state, &entry_key(seq), &entry)?;
    store_typed(state, NEXT_SEQ_KEY, &(seq + 1))?;
    store_typed(state, HEAD_KEY, &event_hash)?;
    Ok(())
}

/// Reads the whole journal in sequence order.
pub fn read_all(state: &dyn StateAccess) -> Result<Vec<JournalEntry>, FlowError> {
    let rows = state.prefix_scan(ENTRY_PREFIX)?;
    let mut entries = Vec::with_capacity(rows.len());
    for (_, raw) in rows {
        entries.push(codec::from_bytes_canonical(&raw)?);
    }
    Ok(entries)
}

/// Reads just the events, in sequence order.
pub fn events(state: &dyn StateAccess) -> Result<Vec<KernelEvent>, FlowError> {
    Ok(read_all(state)?.into_iter().map(|e| e.event).collect())
}

/// The current chain head, all-zero for an empty journal.
pub fn head(state: &dyn StateAccess) -> Result<[u8; 32], FlowError> {
    Ok(load_typed(state, HEAD_KEY)?.unwrap_or([0u8; 32]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use siphon_api::state::MemoryState;
    use siphon_types::primitives::{Address, Amount, ChannelId};

    fn probe_event(n: u8) -> KernelEvent {
        KernelEvent::Pulled {
            id: ChannelId([n; 32]),
            to: Address([n; 20]),
            amount: Amount::from(n as u64),
        }
    }

    #[test]
    fn entries_chain_in_sequence_order() {
        let mut state = MemoryState::default();
        let ctx = CallContext::new(Address([1; 20]), 100);
        emit(&mut state, &ctx, probe_event(1)).expect("emit 1");
        emit(&mut state, &ctx, probe_event(2)).expect("emit 2");

        let entries = read_all(&state).expect("read");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].seq, 0);
        assert_eq!(entries[1].seq, 1);
        assert_eq!(head(&state).unwrap(), entries[1].event_hash);
        assert_ne!(entries[0].event_hash, entries[1].event_hash);
    }

    #[test]
    fn empty_journal_has_zero_head() {
        let state = MemoryState::default();
        assert_eq!(head(&state).unwrap(), [0u8; 32]);
        assert!(events(&state).unwrap().is_empty());
    }
}
