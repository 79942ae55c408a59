// Path: crates/services/src/support.rs

//! Shared load/store and guard helpers for kernel components.

use parity_scale_codec::{Decode, Encode};
use siphon_api::state::StateAccess;
use siphon_types::codec;
use siphon_types::error::FlowError;

pub(crate) fn load_typed<T: Decode>(
    state: &dyn StateAccess,
    key: &[u8],
) -> Result<Option<T>, FlowError> {
    let Some(raw) = state.get(key)? else {
        return Ok(None);
    };
    Ok(Some(codec::from_bytes_canonical(&raw)?))
}

pub(crate) fn store_typed<T: Encode>(
    state: &mut dyn StateAccess,
    key: &[u8],
    value: &T,
) -> Result<(), FlowError> {
    let bytes = codec::to_bytes_canonical(value);
    state.insert(key, &bytes)?;
    Ok(())
}

/// Takes a component entry guard. A nested call observing the guard fails
/// with `Reentrancy` instead of interleaving with the in-flight operation.
pub(crate) fn acquire_latch(state: &mut dyn StateAccess, key: &[u8]) -> Result<(), FlowError> {
    if state.get(key)?.is_some() {
        return Err(FlowError::Reentrancy);
    }
    state.insert(key, &[1u8])?;
    Ok(())
}

/// Releases a component entry guard taken with [`acquire_latch`].
pub(crate) fn release_latch(state: &mut dyn StateAccess, key: &[u8]) -> Result<(), FlowError> {
    state.delete(key)?;
    Ok(())
}
