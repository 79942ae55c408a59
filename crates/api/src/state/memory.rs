// Path: crates/api/src/state/memory.rs

//! BTreeMap-backed state for embedding hosts and tests.

use crate::state::{StateAccess, StateKVPair};
use siphon_types::error::StateError;
use std::collections::BTreeMap;

/// An in-memory [`StateAccess`] backed by an ordered map.
///
/// The reference host state: deterministic iteration, no I/O, no failure
/// modes. Production hosts substitute their own store.
#[derive(Default, Debug, Clone)]
pub struct MemoryState {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryState {
    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl StateAccess for MemoryState {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        Ok(self.data.get(key).cloned())
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.data.remove(key);
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<StateKVPair>, StateError> {
        Ok(self
            .data
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }
}
