// Path: crates/services/tests/cross_domain_rebalance.rs

//! End-to-end cross-domain plane: a signed flow intent moves value from a
//! source domain to a destination receiver through the rebalancer and its
//! adapter, and the settlement mesh keeps destinations at their target
//! shares through the adaptive router.

use siphon_api::account::KeyholderOnly;
use siphon_api::context::CallContext;
use siphon_api::state::MemoryState;
use siphon_crypto::signer::LocalSigner;
use siphon_crypto::typed::intent_hash;
use siphon_services::{
    journal, AdaptiveRouter, ConsentRegistry, DirectPullAdapter, DomainDirectory, FlowChannel,
    IntentRegistry, PolicyEnforcer, Rebalancer, SettlementMesh, StateLedger, UniversalClock,
};
use siphon_types::consent::{FlowIntent, FlowIntentEnvelope};
use siphon_types::error::FlowError;
use siphon_types::events::KernelEvent;
use siphon_types::primitives::{Address, Amount, AuthHash, ChannelId, DomainId};

const GOVERNANCE: Address = Address([0xc0; 20]);
const REB_ADDR: Address = Address([0xb0; 20]);
const REG_ADDR: Address = Address([0xd0; 20]);
const ADAPTER_ADDR: Address = Address([0xad; 20]);
const EXECUTOR: Address = Address([0xe0; 20]);
const RECEIVER: Address = Address([0xaa; 20]);
const TOKEN: Address = Address([0xee; 20]);
const D1: DomainId = DomainId([1; 32]);
const D2: DomainId = DomainId([2; 32]);
const AUTH: AuthHash = AuthHash([9; 32]);

#[test]
fn a_signed_intent_moves_value_until_its_cap_and_domain_policy_stop_it() {
    let mut state = MemoryState::default();
    let signer = LocalSigner::from_seed([0x42; 32]);
    let grantor = signer.address();
    let governance_ctx = CallContext::new(GOVERNANCE, 0);
    let ledger = StateLedger;

    // Consent plane: the adapter is the trusted executor on D1.
    let consents = ConsentRegistry;
    consents
        .initialize(&mut state, &governance_ctx)
        .expect("init consents");
    consents
        .set_trusted_executor(&mut state, &governance_ctx, ADAPTER_ADDR, true)
        .expect("trust adapter");

    // Directory: both domains active, the executor approved in both,
    // value arriving in D2 lands at RECEIVER.
    let directory = DomainDirectory;
    directory
        .initialize(&mut state, &governance_ctx)
        .expect("init directory");
    directory
        .set_domain(&mut state, &governance_ctx, D1, ADAPTER_ADDR, Address([0x11; 20]), true)
        .expect("D1");
    directory
        .set_domain(&mut state, &governance_ctx, D2, Address([0x12; 20]), RECEIVER, true)
        .expect("D2");
    for domain in [D1, D2] {
        directory
            .set_executor_approval(&mut state, &governance_ctx, domain, EXECUTOR, true)
            .expect("approve executor");
    }

    // Source adapter backing D1.
    let adapter = DirectPullAdapter::new(ADAPTER_ADDR, ledger);
    adapter
        .initialize(&mut state, &governance_ctx)
        .expect("init adapter");
    adapter
        .register_right(&mut state, &governance_ctx, AUTH, grantor, TOKEN)
        .expect("register right");
    adapter
        .set_caller_approval(&mut state, &governance_ctx, REB_ADDR, true)
        .expect("approve rebalancer");

    ledger
        .mint(&mut state, TOKEN, grantor, Amount::from(5_000u64))
        .expect("mint");
    ledger
        .approve(
            &mut state,
            &CallContext::new(grantor, 0),
            TOKEN,
            ADAPTER_ADDR,
            Amount::from(5_000u64),
        )
        .expect("approve");

    // Intent plane: the registry answers only to the rebalancer.
    let intents = IntentRegistry::new(REG_ADDR, 7, KeyholderOnly);
    intents
        .initialize(&mut state, &CallContext::new(REB_ADDR, 0))
        .expect("bind registry");
    let rebalancer = Rebalancer::new(REB_ADDR, intents);
    rebalancer
        .initialize(&mut state, &governance_ctx)
        .expect("init rebalancer");

    let intent = FlowIntent {
        grantor,
        executor: EXECUTOR,
        src_domain: D1,
        dst_domain: D2,
        token: TOKEN,
        max_total: Amount::from(1_000u64),
        valid_after: 0,
        valid_before: 1_000,
        nonce: 1,
        metadata_hash: [0; 32],
    };
    let digest = rebalancer
        .intents()
        .domain()
        .typed_digest(intent_hash(&intent).0);
    let envelope = FlowIntentEnvelope {
        intent,
        auth_hash: AUTH,
        signature: signer.sign_digest(digest).expect("sign"),
    };

    // t=100: the executor moves 300.
    let hash = rebalancer
        .execute_flow_intent(
            &mut state,
            &CallContext::new(EXECUTOR, 100),
            &envelope,
            Amount::from(300u64),
            &adapter,
        )
        .expect("move 300");
    assert_eq!(
        rebalancer.intents().moved_so_far(&state, hash).unwrap(),
        Amount::from(300u64)
    );
    assert_eq!(
        consents.pulled_total(&state, AUTH).unwrap(),
        Amount::from(300u64)
    );
    assert_eq!(
        ledger.balance_of(&state, TOKEN, grantor).unwrap(),
        Amount::from(4_700u64)
    );
    assert_eq!(
        ledger.balance_of(&state, TOKEN, RECEIVER).unwrap(),
        Amount::from(300u64)
    );

    // 300 + 800 breaches the cap; nothing moves.
    assert!(matches!(
        rebalancer.execute_flow_intent(
            &mut state,
            &CallContext::new(EXECUTOR, 110),
            &envelope,
            Amount::from(800u64),
            &adapter,
        ),
        Err(FlowError::CapExceeded)
    ));

    // Governance deactivates the destination domain.
    directory
        .set_domain(
            &mut state,
            &CallContext::new(GOVERNANCE, 120),
            D2,
            Address([0x12; 20]),
            RECEIVER,
            false,
        )
        .expect("deactivate D2");
    assert!(matches!(
        rebalancer.execute_flow_intent(
            &mut state,
            &CallContext::new(EXECUTOR, 130),
            &envelope,
            Amount::from(100u64),
            &adapter,
        ),
        Err(FlowError::ExecutorForbidden)
    ));

    let events = journal::events(&state).expect("journal");
    assert!(events.iter().any(|e| matches!(
        e,
        KernelEvent::RebalanceExecuted { amount, executor, .. }
            if *amount == Amount::from(300u64) && *executor == EXECUTOR
    )));
}

const CHANNEL_ADDR: Address = Address([0xcc; 20]);
const ROUTER_ADDR: Address = Address([0xa0; 20]);
const MESH_ADDR: Address = Address([0xa1; 20]);
const OPERATOR: Address = Address([0xc1; 20]);
const R1: Address = Address([0xd1; 20]);
const R2: Address = Address([0xd2; 20]);
const FEED: ChannelId = ChannelId([3; 32]);

#[test]
fn the_mesh_tops_up_the_most_underweight_destination() {
    let mut state = MemoryState::default();
    let ledger = StateLedger;
    let grantor = Address([1; 20]);
    let operator_ctx = CallContext::new(OPERATOR, 0);

    ledger
        .mint(&mut state, TOKEN, grantor, Amount::from(100_000u64))
        .expect("mint");
    ledger
        .approve(
            &mut state,
            &CallContext::new(grantor, 0),
            TOKEN,
            CHANNEL_ADDR,
            Amount::from(100_000u64),
        )
        .expect("approve");

    let clock = UniversalClock::new(60, 0).expect("clock");
    let channels = FlowChannel::new(CHANNEL_ADDR, ledger, PolicyEnforcer::new(clock));
    channels
        .open(
            &mut state,
            &CallContext::new(grantor, 0),
            FEED,
            ROUTER_ADDR,
            TOKEN,
            Amount::from(100u64),
            Amount::from(50_000u64),
            None,
        )
        .expect("open feed");

    let router = AdaptiveRouter::new(ROUTER_ADDR, channels);
    router
        .initialize(&mut state, &CallContext::new(MESH_ADDR, 0))
        .expect("router answers to the mesh");
    router
        .register_channel(&mut state, &CallContext::new(MESH_ADDR, 0), FEED, 10)
        .expect("register feed");

    let mesh = SettlementMesh::new(MESH_ADDR, router);
    mesh.initialize(&mut state, &operator_ctx).expect("init mesh");
    mesh.configure_destination(&mut state, &operator_ctx, R1, 7_000, true)
        .expect("R1 at 70%");
    mesh.configure_destination(&mut state, &operator_ctx, R2, 3_000, true)
        .expect("R2 at 30%");

    let report_ctx = CallContext::new(OPERATOR, 10);
    mesh.report(&mut state, &report_ctx, R1, Amount::from(400u64), Amount::from(1_000u64))
        .expect("report R1");
    mesh.report(&mut state, &report_ctx, R2, Amount::from(500u64), Amount::from(1_000u64))
        .expect("report R2");

    // R1 wants 700, holds 400; R2 is over target. One tick tops R1 up.
    let step = mesh
        .rebalance_tick(&mut state, &report_ctx, Amount::from(1_000u64))
        .expect("tick");
    assert_eq!(step, Some((R1, Amount::from(300u64))));
    assert_eq!(
        ledger.balance_of(&state, TOKEN, R1).unwrap(),
        Amount::from(300u64)
    );

    let events = journal::events(&state).expect("journal");
    assert!(events.iter().any(|e| matches!(
        e,
        KernelEvent::MeshStep { dest, deficit, sent }
            if *dest == R1
                && *deficit == Amount::from(300u64)
                && *sent == Amount::from(300u64)
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        KernelEvent::Routed { channel_id, to, amount }
            if *channel_id == FEED && *to == R1 && *amount == Amount::from(300u64)
    )));
}

#[test]
fn an_empty_feed_routes_a_loud_zero() {
    let mut state = MemoryState::default();
    let ledger = StateLedger;
    let grantor = Address([1; 20]);
    let operator_ctx = CallContext::new(OPERATOR, 0);

    let clock = UniversalClock::new(60, 0).expect("clock");
    let channels = FlowChannel::new(CHANNEL_ADDR, ledger, PolicyEnforcer::new(clock));
    channels
        .open(
            &mut state,
            &CallContext::new(grantor, 0),
            FEED,
            ROUTER_ADDR,
            TOKEN,
            Amount::from(100u64),
            Amount::from(50_000u64),
            None,
        )
        .expect("open feed");

    let router = AdaptiveRouter::new(ROUTER_ADDR, channels);
    router
        .initialize(&mut state, &CallContext::new(MESH_ADDR, 0))
        .expect("router answers to the mesh");
    router
        .register_channel(&mut state, &CallContext::new(MESH_ADDR, 0), FEED, 10)
        .expect("register feed");

    let mesh = SettlementMesh::new(MESH_ADDR, router);
    mesh.initialize(&mut state, &operator_ctx).expect("init mesh");
    mesh.configure_destination(&mut state, &operator_ctx, R1, 7_000, true)
        .expect("configure R1");
    mesh.report(&mut state, &operator_ctx, R1, Amount::ZERO, Amount::from(1_000u64))
        .expect("report R1");

    // t=0: nothing has accrued, so the step requests 700 and routes 0 —
    // loudly, for telemetry.
    let step = mesh
        .rebalance_tick(&mut state, &operator_ctx, Amount::from(1_000u64))
        .expect("tick");
    assert_eq!(step, Some((R1, Amount::from(700u64))));

    let events = journal::events(&state).expect("journal");
    assert!(events.iter().any(|e| matches!(
        e,
        KernelEvent::Routed { channel_id, to, amount }
            if *channel_id == FEED && *to == R1 && amount.is_zero()
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        KernelEvent::MeshStep { dest, deficit, sent }
            if *dest == R1
                && *deficit == Amount::from(700u64)
                && *sent == Amount::from(700u64)
    )));
}
