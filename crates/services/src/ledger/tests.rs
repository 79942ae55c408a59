// Path: crates/services/src/ledger/tests.rs

use super::*;
use siphon_api::state::MemoryState;

const TOKEN: Address = Address([0xee; 20]);
const OWNER: Address = Address([1; 20]);
const SPENDER: Address = Address([2; 20]);
const RECIPIENT: Address = Address([3; 20]);

fn seeded_state() -> MemoryState {
    let mut state = MemoryState::default();
    let ledger = StateLedger;
    ledger
        .mint(&mut state, TOKEN, OWNER, Amount::from(500u64))
        .expect("mint");
    let owner_ctx = CallContext::new(OWNER, 0);
    ledger
        .approve(&mut state, &owner_ctx, TOKEN, SPENDER, Amount::from(200u64))
        .expect("approve");
    state
}

#[test]
fn transfer_from_moves_value_and_burns_allowance() {
    let mut state = seeded_state();
    let ledger = StateLedger;
    let spender_ctx = CallContext::new(SPENDER, 0);

    ledger
        .transfer_from(
            &mut state,
            &spender_ctx,
            TOKEN,
            OWNER,
            RECIPIENT,
            Amount::from(150u64),
        )
        .expect("transfer");

    assert_eq!(
        ledger.balance_of(&state, TOKEN, OWNER).unwrap(),
        Amount::from(350u64)
    );
    assert_eq!(
        ledger.balance_of(&state, TOKEN, RECIPIENT).unwrap(),
        Amount::from(150u64)
    );
    assert_eq!(
        ledger.allowance(&state, TOKEN, OWNER, SPENDER).unwrap(),
        Amount::from(50u64)
    );
}

#[test]
fn transfer_from_fails_closed_without_allowance_or_balance() {
    let mut state = seeded_state();
    let ledger = StateLedger;
    let spender_ctx = CallContext::new(SPENDER, 0);

    // Exceeds allowance (200) though balance (500) would cover it.
    assert!(matches!(
        ledger.transfer_from(
            &mut state,
            &spender_ctx,
            TOKEN,
            OWNER,
            RECIPIENT,
            Amount::from(201u64),
        ),
        Err(FlowError::TransferFail)
    ));

    // An unapproved spender has zero allowance.
    let stranger_ctx = CallContext::new(Address([9; 20]), 0);
    assert!(matches!(
        ledger.transfer_from(
            &mut state,
            &stranger_ctx,
            TOKEN,
            OWNER,
            RECIPIENT,
            Amount::from(1u64),
        ),
        Err(FlowError::TransferFail)
    ));

    // Failed attempts left every balance untouched.
    assert_eq!(
        ledger.balance_of(&state, TOKEN, OWNER).unwrap(),
        Amount::from(500u64)
    );
    assert_eq!(
        ledger.balance_of(&state, TOKEN, RECIPIENT).unwrap(),
        Amount::ZERO
    );
}
