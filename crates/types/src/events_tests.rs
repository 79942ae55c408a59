// Path: crates/types/src/events_tests.rs

use crate::codec;
use crate::events::KernelEvent;
use crate::primitives::{Address, Amount, AuthHash};

fn sample() -> KernelEvent {
    KernelEvent::PullExecuted {
        auth_hash: AuthHash([7; 32]),
        token: Address([0xee; 20]),
        grantor: Address([1; 20]),
        grantee: Address([2; 20]),
        amount: Amount::from(60u64),
        cumulative: Amount::from(120u64),
    }
}

#[test]
fn events_round_trip_through_the_canonical_codec() {
    let event = sample();
    let bytes = codec::to_bytes_canonical(&event);
    let back: KernelEvent = codec::from_bytes_canonical(&bytes).expect("decode");
    assert_eq!(back, event);
}

#[test]
fn events_serialize_for_tooling() {
    // The serde surface is what inspection tooling consumes; it must not
    // lose fields.
    let json = serde_json::to_string(&sample()).expect("to json");
    let back: KernelEvent = serde_json::from_str(&json).expect("from json");
    assert_eq!(back, sample());
}
