// Path: crates/api/src/state/overlay.rs

//! A copy-on-write state overlay.

use crate::state::{StateAccess, StateKVPair};
use siphon_types::error::StateError;
use std::collections::BTreeMap;

/// An in-memory, copy-on-write overlay over any [`StateAccess`].
///
/// Reads check the local write set first and fall through to the base
/// state; writes are captured locally and never touch the base. `None` in
/// the write set represents a deletion. The ordered map keeps commit order
/// deterministic.
pub struct StateOverlay<'a> {
    base: &'a dyn StateAccess,
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a> StateOverlay<'a> {
    /// Creates a new, empty overlay on top of a base state.
    pub fn new(base: &'a dyn StateAccess) -> Self {
        Self {
            base,
            writes: BTreeMap::new(),
        }
    }

    /// Consumes the overlay, yielding its captured writes in key order.
    pub fn into_writes(self) -> BTreeMap<Vec<u8>, Option<Vec<u8>>> {
        self.writes
    }
}

impl StateAccess for StateOverlay<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError> {
        if let Some(write) = self.writes.get(key) {
            Ok(write.clone())
        } else {
            self.base.get(key)
        }
    }

    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StateError> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<StateKVPair>, StateError> {
        let mut rows: BTreeMap<Vec<u8>, Vec<u8>> = self
            .base
            .prefix_scan(prefix)?
            .into_iter()
            .collect();
        for (key, write) in &self.writes {
            if !key.starts_with(prefix) {
                continue;
            }
            match write {
                Some(value) => {
                    rows.insert(key.clone(), value.clone());
                }
                None => {
                    rows.remove(key);
                }
            }
        }
        Ok(rows.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryState;

    #[test]
    fn reads_fall_through_and_writes_shadow() {
        let mut base = MemoryState::default();
        base.insert(b"a", b"1").unwrap();
        base.insert(b"b", b"2").unwrap();

        let mut overlay = StateOverlay::new(&base);
        assert_eq!(overlay.get(b"a").unwrap(), Some(b"1".to_vec()));
        overlay.insert(b"a", b"9").unwrap();
        overlay.delete(b"b").unwrap();
        assert_eq!(overlay.get(b"a").unwrap(), Some(b"9".to_vec()));
        assert_eq!(overlay.get(b"b").unwrap(), None);

        // Base is untouched until the writes are committed by the caller.
        assert_eq!(base.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(base.get(b"b").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn prefix_scan_merges_overlay_writes() {
        let mut base = MemoryState::default();
        base.insert(b"p::1", b"x").unwrap();
        base.insert(b"p::2", b"y").unwrap();

        let mut overlay = StateOverlay::new(&base);
        overlay.delete(b"p::1").unwrap();
        overlay.insert(b"p::3", b"z").unwrap();

        let rows = overlay.prefix_scan(b"p::").unwrap();
        assert_eq!(
            rows,
            vec![
                (b"p::2".to_vec(), b"y".to_vec()),
                (b"p::3".to_vec(), b"z".to_vec()),
            ]
        );
    }
}
