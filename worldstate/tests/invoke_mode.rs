//! `is_invoke` integration tests.
//!
//! Invoke queries use tracked scans: they see the transaction's pending
//! writes and leave their reads in the read set. Evaluate queries page
//! through committed state and make the transaction read-only.

mod common;

use worldstate::{IStateConfig, StateInterface};
use worldstate_primitives::ErrorCode;
use worldstate_stub::ChaincodeStub;

use common::*;

// ── Test: invoke sees pending writes ──

#[test]
fn test_invoke_query_sees_pending_writes() -> anyhow::Result<()> {
    let state = cars_state();
    let mut stub = seeded(&state, &fleet());

    state.create_state(&mut stub, &car("CAR8", "toyota", "green", 12_000.0, "hal"))?;
    state.delete_state(&mut stub, &"CAR0".into())?;

    let found = state.query(&stub, r#"{"make": "eq toyota"}"#, true)?;
    assert_eq!(ids(&found), vec!["CAR2", "CAR8"]);
    Ok(())
}

// ── Test: invoke reads are tracked ──

#[test]
fn test_invoke_query_populates_read_set() -> anyhow::Result<()> {
    let state = cars_state();
    let stub = seeded(&state, &fleet());

    state.query(&stub, r#"{"make": "eq tesla"}"#, true)?;

    let reads = stub.read_set();
    assert!(!reads.ranges().is_empty());
    let record = stub.create_composite_key("car", &["CAR3"])?;
    assert!(reads.contains(&record));
    Ok(())
}

#[test]
fn test_doc_scan_range_is_tracked() -> anyhow::Result<()> {
    let state = cars_state_with(IStateConfig::indexing(["make"]));
    let stub = seeded(&state, &fleet());

    state.query(&stub, r#"{"color": "eq red"}"#, true)?;

    let reads = stub.read_set();
    assert_eq!(reads.ranges().len(), 1);
    assert_eq!(reads.ranges()[0].keys.len(), fleet().len());
    Ok(())
}

// ── Test: evaluate pages through committed state ──

#[test]
fn test_evaluate_query_pages() -> anyhow::Result<()> {
    let state = cars_state_with(IStateConfig {
        page_size: 2,
        ..IStateConfig::default()
    });
    let stub = seeded(&state, &fleet());

    let found = state.query(&stub, r#"{"price": "gt 0"}"#, false)?;
    assert_eq!(ids(&found), vec!["CAR0", "CAR1", "CAR2", "CAR3"]);
    assert!(stub.is_read_only());
    assert!(stub.read_set().ranges().is_empty());
    Ok(())
}

#[test]
fn test_evaluate_matches_invoke() -> anyhow::Result<()> {
    let state = cars_state_with(IStateConfig {
        page_size: 1,
        ..IStateConfig::default()
    });
    let stub = seeded(&state, &fleet());

    for text in [
        r#"{"make": "eq ford"}"#,
        r#"{"owner.name": "cnt a"}"#,
        r#"[{"price": "lt 10000"}, {"color": "eq white"}]"#,
    ] {
        let invoke = state.query(&stub, text, true)?;
        let evaluate = state.query(&stub, text, false)?;
        assert_eq!(invoke, evaluate, "{}", text);
    }
    Ok(())
}

// ── Test: evaluate and writes do not mix ──

#[test]
fn test_evaluate_query_after_write_fails() {
    let state = cars_state();
    let mut stub = seeded(&state, &fleet());

    state
        .create_state(&mut stub, &car("CAR8", "kia", "grey", 1.0, "ivy"))
        .unwrap();
    let err = state.query(&stub, r#"{"make": "eq kia"}"#, false).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ReadOnlyViolation);
}

#[test]
fn test_write_after_evaluate_query_fails() -> anyhow::Result<()> {
    let state = cars_state();
    let mut stub = seeded(&state, &fleet());

    state.query(&stub, r#"{"make": "eq ford"}"#, false)?;
    let err = state
        .create_state(&mut stub, &car("CAR8", "kia", "grey", 1.0, "ivy"))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ReadOnlyViolation);

    // A new transaction may write again.
    stub.commit()?;
    state.create_state(&mut stub, &car("CAR8", "kia", "grey", 1.0, "ivy"))?;
    Ok(())
}
