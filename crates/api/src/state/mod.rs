// Path: crates/api/src/state/mod.rs
//! The keyed byte-store every kernel component executes against.

use siphon_types::error::StateError;

mod memory;
mod overlay;

pub use memory::MemoryState;
pub use overlay::StateOverlay;

/// A key-value pair from the state.
pub type StateKVPair = (Vec<u8>, Vec<u8>);

/// A dyn-safe keyed byte store.
///
/// The host guarantees exclusive access for the duration of one kernel
/// operation; components never observe interleaved writes.
pub trait StateAccess {
    /// Gets a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StateError>;
    /// Inserts a key-value pair, replacing any existing value.
    fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StateError>;
    /// Deletes a key-value pair.
    fn delete(&mut self, key: &[u8]) -> Result<(), StateError>;
    /// Sets multiple key-value pairs in a single batch operation.
    fn batch_set(&mut self, updates: &[(Vec<u8>, Vec<u8>)]) -> Result<(), StateError> {
        for (key, value) in updates {
            self.insert(key, value)?;
        }
        Ok(())
    }
    /// Returns all key-value pairs whose key starts with `prefix`, in key
    /// order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<StateKVPair>, StateError>;
}

/// Runs `op` against a copy-on-write overlay of `state` and commits the
/// overlay's writes only if `op` succeeds.
///
/// This is the kernel's atomicity boundary: a failing operation leaves the
/// base state untouched no matter how far it got, including any journal
/// entries it appended along the way.
pub fn run_atomic<T, E>(
    state: &mut dyn StateAccess,
    op: impl FnOnce(&mut StateOverlay<'_>) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<StateError>,
{
    let (value, writes) = {
        let mut overlay = StateOverlay::new(&*state);
        let value = op(&mut overlay)?;
        (value, overlay.into_writes())
    };
    for (key, write) in writes {
        match write {
            Some(value) => state.insert(&key, &value)?,
            None => state.delete(&key)?,
        }
    }
    Ok(value)
}
