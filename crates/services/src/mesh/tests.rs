// Path: crates/services/src/mesh/tests.rs

use super::*;
use crate::channel::FlowChannel;
use crate::clock::UniversalClock;
use crate::ledger::StateLedger;
use crate::policy::PolicyEnforcer;
use siphon_api::state::MemoryState;
use siphon_types::primitives::ChannelId;

const CHANNEL_ADDR: Address = Address([0xcc; 20]);
const ROUTER_ADDR: Address = Address([0xaa; 20]);
const MESH_ADDR: Address = Address([0xab; 20]);
const OPERATOR: Address = Address([0xc0; 20]);
const GRANTOR: Address = Address([1; 20]);
const R1: Address = Address([0xd1; 20]);
const R2: Address = Address([0xd2; 20]);
const TOKEN: Address = Address([0xee; 20]);
const FEED: ChannelId = ChannelId([1; 32]);

fn mesh() -> SettlementMesh<StateLedger> {
    let clock = UniversalClock::new(60, 0).expect("clock");
    let channels = FlowChannel::new(CHANNEL_ADDR, StateLedger, PolicyEnforcer::new(clock));
    let router = AdaptiveRouter::new(ROUTER_ADDR, channels);
    SettlementMesh::new(MESH_ADDR, router)
}

fn wired(mesh: &SettlementMesh<StateLedger>) -> MemoryState {
    let mut state = MemoryState::default();
    let operator_ctx = CallContext::new(OPERATOR, 0);
    let ledger = StateLedger;
    ledger
        .mint(&mut state, TOKEN, GRANTOR, Amount::from(100_000u64))
        .expect("mint");
    ledger
        .approve(
            &mut state,
            &CallContext::new(GRANTOR, 0),
            TOKEN,
            CHANNEL_ADDR,
            Amount::from(100_000u64),
        )
        .expect("approve");

    let clock = UniversalClock::new(60, 0).expect("clock");
    let channels = FlowChannel::new(CHANNEL_ADDR, StateLedger, PolicyEnforcer::new(clock));
    channels
        .open(
            &mut state,
            &CallContext::new(GRANTOR, 0),
            FEED,
            ROUTER_ADDR,
            TOKEN,
            Amount::from(100u64),
            Amount::from(50_000u64),
            None,
        )
        .expect("open feed channel");

    // The mesh owns the router; the operator owns the mesh.
    mesh.router()
        .initialize(&mut state, &CallContext::new(MESH_ADDR, 0))
        .expect("bind router to mesh");
    mesh.router()
        .register_channel(&mut state, &CallContext::new(MESH_ADDR, 0), FEED, 10)
        .expect("register feed");

    mesh.initialize(&mut state, &operator_ctx).expect("init mesh");
    mesh.configure_destination(&mut state, &operator_ctx, R1, 7_000, true)
        .expect("configure R1");
    mesh.configure_destination(&mut state, &operator_ctx, R2, 3_000, true)
        .expect("configure R2");
    state
}

#[test]
fn the_deepest_deficit_is_served_first() {
    let mesh = mesh();
    let mut state = wired(&mesh);
    let ctx = CallContext::new(OPERATOR, 10);

    // Targets at total 1_000: R1 wants 700, R2 wants 300.
    mesh.report(&mut state, &ctx, R1, Amount::from(400u64), Amount::from(1_000u64))
        .expect("report R1");
    mesh.report(&mut state, &ctx, R2, Amount::from(500u64), Amount::from(1_000u64))
        .expect("report R2");

    let step = mesh
        .rebalance_tick(&mut state, &ctx, Amount::from(1_000u64))
        .expect("tick");
    assert_eq!(step, Some((R1, Amount::from(300u64))));
    assert_eq!(
        StateLedger.balance_of(&state, TOKEN, R1).unwrap(),
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
}

#[test]
fn a_balanced_mesh_ticks_to_a_no_op() {
    let mesh = mesh();
    let mut state = wired(&mesh);
    let ctx = CallContext::new(OPERATOR, 10);

    mesh.report(&mut state, &ctx, R1, Amount::from(700u64), Amount::from(1_000u64))
        .expect("report R1");
    mesh.report(&mut state, &ctx, R2, Amount::from(300u64), Amount::from(1_000u64))
        .expect("report R2");

    assert_eq!(
        mesh.rebalance_tick(&mut state, &ctx, Amount::from(1_000u64))
            .expect("tick"),
        None
    );
    // Idempotent: a second tick over the same reports is still a no-op.
    assert_eq!(
        mesh.rebalance_tick(&mut state, &ctx, Amount::from(1_000u64))
            .expect("tick again"),
        None
    );
}

#[test]
fn steps_are_bounded_by_max_step_amount() {
    let mesh = mesh();
    let mut state = wired(&mesh);
    let ctx = CallContext::new(OPERATOR, 10);

    mesh.report(&mut state, &ctx, R1, Amount::ZERO, Amount::from(1_000u64))
        .expect("report R1");
    let step = mesh
        .rebalance_tick(&mut state, &ctx, Amount::from(100u64))
        .expect("tick");
    assert_eq!(step, Some((R1, Amount::from(100u64))));
}

#[test]
fn zero_total_and_inactive_destinations_are_skipped() {
    let mesh = mesh();
    let mut state = wired(&mesh);
    let ctx = CallContext::new(OPERATOR, 10);

    assert_eq!(
        mesh.rebalance_tick(&mut state, &ctx, Amount::from(100u64))
            .expect("tick with no reports"),
        None
    );

    mesh.report(&mut state, &ctx, R1, Amount::ZERO, Amount::from(1_000u64))
        .expect("report");
    mesh.configure_destination(&mut state, &ctx, R1, 7_000, false)
        .expect("deactivate R1");
    mesh.configure_destination(&mut state, &ctx, R2, 0, true)
        .expect("zero R2's share");
    assert_eq!(
        mesh.rebalance_tick(&mut state, &ctx, Amount::from(100u64))
            .expect("tick"),
        None
    );
}

#[test]
fn configuration_is_validated_and_controller_only() {
    let mesh = mesh();
    let mut state = wired(&mesh);
    assert!(matches!(
        mesh.configure_destination(
            &mut state,
            &CallContext::new(OPERATOR, 1),
            R1,
            10_001,
            true
        ),
        Err(FlowError::BadParameters(_))
    ));
    assert!(matches!(
        mesh.configure_destination(&mut state, &CallContext::new(GRANTOR, 1), R1, 1, true),
        Err(FlowError::NotController)
    ));
    assert!(matches!(
        mesh.report(
            &mut state,
            &CallContext::new(OPERATOR, 1),
            Address([9; 20]),
            Amount::ZERO,
            Amount::ZERO
        ),
        Err(FlowError::BadId)
    ));
}
