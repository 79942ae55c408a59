// Path: crates/services/src/ledger/mod.rs

//! The reference token ledger.
//!
//! A state-backed implementation of the external [`TokenLedger`] contract,
//! used by the embedding host and the test suites. Balances and
//! allowances live under the `ledger::` namespace; `transfer_from` moves
//! value on the spending authority of the calling component and fails
//! closed as `TransferFail` whenever the allowance or balance does not
//! cover the move.

use crate::support::{load_typed, store_typed};
use siphon_api::context::CallContext;
use siphon_api::state::StateAccess;
use siphon_api::token::TokenLedger;
use siphon_types::error::FlowError;
use siphon_types::primitives::{Address, Amount};

const BALANCE_PREFIX: &[u8] = b"ledger::balance::";
const ALLOWANCE_PREFIX: &[u8] = b"ledger::allowance::";

fn balance_key(token: Address, holder: Address) -> Vec<u8> {
    [BALANCE_PREFIX, token.as_ref(), b"::", holder.as_ref()].concat()
}

fn allowance_key(token: Address, owner: Address, spender: Address) -> Vec<u8> {
    [
        ALLOWANCE_PREFIX,
        token.as_ref(),
        b"::",
        owner.as_ref(),
        b"::",
        spender.as_ref(),
    ]
    .concat()
}

/// The state-backed reference ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateLedger;

impl StateLedger {
    /// Credits `amount` of `token` to `holder`. Host-level seeding; the
    /// kernel never mints.
    pub fn mint(
        &self,
        state: &mut dyn StateAccess,
        token: Address,
        holder: Address,
        amount: Amount,
    ) -> Result<(), FlowError> {
        let key = balance_key(token, holder);
        let balance: Amount = load_typed(state, &key)?.unwrap_or(Amount::ZERO);
        let updated = balance
            .checked_add(amount)
            .ok_or(FlowError::ArithmeticOverflow)?;
        store_typed(state, &key, &updated)
    }

    /// Sets the allowance granted by `ctx.caller` to `spender` for
    /// `token`. Overwrites any previous allowance.
    pub fn approve(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        token: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), FlowError> {
        store_typed(state, &allowance_key(token, ctx.caller, spender), &amount)
    }

    /// The balance of `holder` in `token`.
    pub fn balance_of(
        &self,
        state: &dyn StateAccess,
        token: Address,
        holder: Address,
    ) -> Result<Amount, FlowError> {
        Ok(load_typed(state, &balance_key(token, holder))?.unwrap_or(Amount::ZERO))
    }

    /// The allowance granted by `owner` to `spender` for `token`.
    pub fn allowance(
        &self,
        state: &dyn StateAccess,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<Amount, FlowError> {
        Ok(load_typed(state, &allowance_key(token, owner, spender))?.unwrap_or(Amount::ZERO))
    }
}

impl TokenLedger for StateLedger {
    fn transfer_from(
        &self,
        state: &mut dyn StateAccess,
        ctx: &CallContext,
        token: Address,
        owner: Address,
        recipient: Address,
        amount: Amount,
    ) -> Result<(), FlowError> {
        let spend_key = allowance_key(token, owner, ctx.caller);
        let allowance: Amount = load_typed(state, &spend_key)?.unwrap_or(Amount::ZERO);
        let owner_key = balance_key(token, owner);
        let owner_balance: Amount = load_typed(state, &owner_key)?.unwrap_or(Amount::ZERO);

        let (remaining_allowance, remaining_balance) =
            match (allowance.checked_sub(amount), owner_balance.checked_sub(amount)) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(FlowError::TransferFail),
            };

        let recipient_key = balance_key(token, recipient);
        let recipient_balance: Amount = load_typed(state, &recipient_key)?.unwrap_or(Amount::ZERO);
        let credited = recipient_balance
            .checked_add(amount)
            .ok_or(FlowError::ArithmeticOverflow)?;

        store_typed(state, &spend_key, &remaining_allowance)?;
        store_typed(state, &owner_key, &remaining_balance)?;
        store_typed(state, &recipient_key, &credited)?;

        log::debug!(
            "ledger: moved {} of 0x{} from 0x{} to 0x{} (spender 0x{})",
            amount,
            hex::encode(token),
            hex::encode(owner),
            hex::encode(recipient),
            hex::encode(ctx.caller),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests;
