// Path: crates/services/tests/per_call_cycle.rs

//! End-to-end per-call pull lifecycle: authorize, pull repeatedly, revoke.

use siphon_api::account::KeyholderOnly;
use siphon_api::context::CallContext;
use siphon_api::state::MemoryState;
use siphon_crypto::signer::LocalSigner;
use siphon_crypto::typed::auth_hash;
use siphon_services::{journal, ConsentRegistry, PullExecutor, StateLedger};
use siphon_types::consent::{Authorization, SignedAuthorization};
use siphon_types::error::FlowError;
use siphon_types::events::KernelEvent;
use siphon_types::primitives::{Address, Amount};

const EXECUTOR_ADDR: Address = Address([0xe0; 20]);
const CONTROLLER: Address = Address([0xc0; 20]);
const GRANTEE: Address = Address([2; 20]);
const TOKEN: Address = Address([0xee; 20]);

#[test]
fn authorize_pull_twice_then_revoke() {
    let mut state = MemoryState::default();
    let signer = LocalSigner::from_seed([0x42; 32]);
    let grantor = signer.address();
    let ledger = StateLedger;
    let registry = ConsentRegistry;

    // Host bootstrap: controller, executor trust, funding, allowance.
    let controller_ctx = CallContext::new(CONTROLLER, 0);
    registry
        .initialize(&mut state, &controller_ctx)
        .expect("init registry");
    registry
        .set_trusted_executor(&mut state, &controller_ctx, EXECUTOR_ADDR, true)
        .expect("trust executor");
    ledger
        .mint(&mut state, TOKEN, grantor, Amount::from(500u64))
        .expect("mint");
    ledger
        .approve(
            &mut state,
            &CallContext::new(grantor, 0),
            TOKEN,
            EXECUTOR_ADDR,
            Amount::from(500u64),
        )
        .expect("approve");

    let executor = PullExecutor::new(EXECUTOR_ADDR, 7, ledger, KeyholderOnly);
    let auth = Authorization {
        grantor,
        grantee: GRANTEE,
        token: TOKEN,
        max_per_pull: Amount::from(100u64),
        valid_after: 0,
        valid_before: 1_000,
        nonce: 1,
    };
    let digest = executor.domain().typed_digest(auth_hash(&auth).0);
    let signed = SignedAuthorization {
        auth: auth.clone(),
        signature: signer.sign_digest(digest).expect("sign"),
    };

    // t=10: first pull of 60.
    let hash = executor
        .pull(
            &mut state,
            &CallContext::new(GRANTEE, 10),
            &signed,
            Amount::from(60u64),
        )
        .expect("first pull");
    assert_eq!(
        ledger.balance_of(&state, TOKEN, grantor).unwrap(),
        Amount::from(440u64)
    );
    assert_eq!(
        ledger.balance_of(&state, TOKEN, GRANTEE).unwrap(),
        Amount::from(60u64)
    );
    assert_eq!(registry.owner_of(&state, hash).unwrap(), Some(grantor));

    // t=20: a second 60 is independent of any cumulative cap here.
    executor
        .pull(
            &mut state,
            &CallContext::new(GRANTEE, 20),
            &signed,
            Amount::from(60u64),
        )
        .expect("second pull");
    assert_eq!(
        registry.pulled_total(&state, hash).unwrap(),
        Amount::from(120u64)
    );

    // The grantor revokes; t=30 finds the authorization dead and the
    // balances unmoved.
    registry
        .revoke(&mut state, &CallContext::new(grantor, 25), hash)
        .expect("revoke");
    assert!(matches!(
        executor.pull(
            &mut state,
            &CallContext::new(GRANTEE, 30),
            &signed,
            Amount::from(10u64),
        ),
        Err(FlowError::Revoked)
    ));
    assert_eq!(
        ledger.balance_of(&state, TOKEN, grantor).unwrap(),
        Amount::from(380u64)
    );
    assert_eq!(
        ledger.balance_of(&state, TOKEN, GRANTEE).unwrap(),
        Amount::from(120u64)
    );

    // The journal tells the whole story, in order.
    let events = journal::events(&state).expect("journal");
    let cumulative: Vec<Amount> = events
        .iter()
        .filter_map(|e| match e {
            KernelEvent::PullExecuted { cumulative, .. } => Some(*cumulative),
            _ => None,
        })
        .collect();
    assert_eq!(cumulative, vec![Amount::from(60u64), Amount::from(120u64)]);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, KernelEvent::PullExecutedDirect { .. }))
            .count(),
        2
    );
    assert!(events
        .iter()
        .any(|e| matches!(e, KernelEvent::AuthorizationRevoked { .. })));
}

#[test]
fn pulled_totals_equal_the_sum_of_executed_events() {
    let mut state = MemoryState::default();
    let signer = LocalSigner::from_seed([0x42; 32]);
    let grantor = signer.address();
    let ledger = StateLedger;
    let registry = ConsentRegistry;
    let controller_ctx = CallContext::new(CONTROLLER, 0);
    registry
        .initialize(&mut state, &controller_ctx)
        .expect("init registry");
    registry
        .set_trusted_executor(&mut state, &controller_ctx, EXECUTOR_ADDR, true)
        .expect("trust executor");
    ledger
        .mint(&mut state, TOKEN, grantor, Amount::from(1_000u64))
        .expect("mint");
    ledger
        .approve(
            &mut state,
            &CallContext::new(grantor, 0),
            TOKEN,
            EXECUTOR_ADDR,
            Amount::from(1_000u64),
        )
        .expect("approve");

    let executor = PullExecutor::new(EXECUTOR_ADDR, 7, ledger, KeyholderOnly);
    let auth = Authorization {
        grantor,
        grantee: GRANTEE,
        token: TOKEN,
        max_per_pull: Amount::from(100u64),
        valid_after: 0,
        valid_before: 1_000,
        nonce: 2,
    };
    let digest = executor.domain().typed_digest(auth_hash(&auth).0);
    let signed = SignedAuthorization {
        auth,
        signature: signer.sign_digest(digest).expect("sign"),
    };

    for (t, amount) in [(1u64, 10u64), (2, 25), (3, 40)] {
        executor
            .pull(
                &mut state,
                &CallContext::new(GRANTEE, t),
                &signed,
                Amount::from(amount),
            )
            .expect("pull");
    }

    let hash = auth_hash(&signed.auth);
    let summed = journal::events(&state)
        .expect("journal")
        .iter()
        .filter_map(|e| match e {
            KernelEvent::PullExecuted {
                auth_hash, amount, ..
            } if *auth_hash == hash => Some(*amount),
            _ => None,
        })
        .fold(Amount::ZERO, |acc, a| acc.checked_add(a).expect("sum"));
    assert_eq!(registry.pulled_total(&state, hash).unwrap(), summed);
}
