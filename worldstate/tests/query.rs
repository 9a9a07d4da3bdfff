//! Rich-query integration tests.
//!
//! Results must be identical whether a condition is answered from the
//! index or from a doc-type scan, so most cases run against both an
//! all-fields index and an index that covers nothing the query uses.

mod common;

use worldstate::{IState, IStateConfig, StateError, StateInterface};
use worldstate_primitives::ErrorCode;
use worldstate_stub::MemStub;

use common::*;

fn states() -> Vec<IState<Car>> {
    vec![
        cars_state(),
        cars_state_with(IStateConfig::indexing(["make"])),
        cars_state_with(IStateConfig::indexing(["serial"])),
    ]
}

fn check(text: &str, expected: &[&str]) {
    for state in states() {
        let stub = seeded(&state, &fleet());
        let found = state.query(&stub, text, true).unwrap();
        assert_eq!(ids(&found), expected, "{} with {:?}", text, state.config());
    }
}

// ── Test: equality ──

#[test]
fn test_eq_string() {
    check(r#"{"make": "eq toyota"}"#, &["CAR0", "CAR2"]);
    check(r#"{"owner.name": "eq ann"}"#, &["CAR0", "CAR4"]);
}

#[test]
fn test_eq_number() {
    check(r#"{"price": "eq 41000"}"#, &["CAR3"]);
    check(r#"{"price": "eq '41000'"}"#, &[]);
}

// ── Test: ranges ──

#[test]
fn test_numeric_ranges() {
    check(r#"{"price": "gt 10000"}"#, &["CAR0", "CAR2", "CAR3"]);
    check(r#"{"price": "lt 0"}"#, &["CAR4"]);
    check(r#"{"price": ["gte 9999.99", "lte 23000"]}"#, &["CAR0", "CAR1", "CAR2"]);
}

#[test]
fn test_string_ranges() {
    check(r#"{"color": "lt c"}"#, &["CAR0", "CAR4"]);
    check(r#"{"make": ["gte ford", "lt tesla"]}"#, &["CAR1", "CAR4"]);
}

// ── Test: neq and cnt ──

#[test]
fn test_neq_and_contains() {
    check(r#"{"make": "neq ford"}"#, &["CAR0", "CAR2", "CAR3"]);
    check(r#"{"owner.name": "cnt an"}"#, &["CAR0", "CAR3", "CAR4"]);
    check(r#"{"tags": "neq x"}"#, &[]);
}

// ── Test: conjunction and disjunction ──

#[test]
fn test_and_or() {
    check(r#"{"make": "eq toyota", "color": "eq red"}"#, &["CAR2"]);
    check(
        r#"[{"make": "eq tesla"}, {"color": "eq red", "price": "lt 10000"}]"#,
        &["CAR1", "CAR3"],
    );
    check(r#"[{"make": "eq ford"}, {"owner.name": "eq ann"}]"#, &["CAR0", "CAR1", "CAR4"]);
}

// ── Test: array fields ──

#[test]
fn test_array_field_matches_any_element() -> anyhow::Result<()> {
    let state = cars_state();
    let mut tagged = car("CAR5", "vw", "blue", 3_000.0, "eve");
    tagged.tags = vec!["classic".into(), "project".into()];
    let stub = seeded(&state, &[tagged]);

    assert_eq!(ids(&state.query(&stub, r#"{"tags": "eq project"}"#, true)?), vec!["CAR5"]);
    assert_eq!(ids(&state.query(&stub, r#"{"tags": "cnt ass"}"#, true)?), vec!["CAR5"]);
    assert!(state.query(&stub, r#"{"tags": "eq modern"}"#, true)?.is_empty());
    Ok(())
}

// ── Test: number ordering across the encoding ──

#[test]
fn test_numeric_order_across_signs_and_magnitudes() -> anyhow::Result<()> {
    let state = cars_state();
    let prices = [-1e12, -3.5, -0.25, 0.0, 0.5, 2.0, 10.0, 1e15];
    let cars: Vec<Car> = prices
        .iter()
        .enumerate()
        .map(|(i, p)| car(&format!("P{}", i), "x", "x", *p, "x"))
        .collect();
    let stub = seeded(&state, &cars);

    assert_eq!(
        ids(&state.query(&stub, r#"{"price": "gte -0.25"}"#, true)?),
        vec!["P2", "P3", "P4", "P5", "P6", "P7"]
    );
    assert_eq!(
        ids(&state.query(&stub, r#"{"price": ["gt -4", "lt 2"]}"#, true)?),
        vec!["P1", "P2", "P3", "P4"]
    );
    assert_eq!(ids(&state.query(&stub, r#"{"price": "eq -0"}"#, true)?), vec!["P3"]);
    Ok(())
}

// ── Test: results are ordered and deduplicated ──

#[test]
fn test_results_unique_and_ordered() -> anyhow::Result<()> {
    let state = cars_state();
    let stub = seeded(&state, &fleet());
    let found = state.query(
        &stub,
        r#"[{"price": "gt 0"}, {"make": "eq ford"}, {"color": "neq white"}]"#,
        true,
    )?;
    assert_eq!(ids(&found), vec!["CAR0", "CAR1", "CAR2", "CAR3", "CAR4"]);
    Ok(())
}

// ── Test: result limit ──

#[test]
fn test_result_limit() {
    let state = cars_state_with(IStateConfig {
        max_query_results: 3,
        ..IStateConfig::default()
    });
    let stub = seeded(&state, &fleet());

    assert_eq!(state.query(&stub, r#"{"make": "eq toyota"}"#, true).unwrap().len(), 2);
    let err = state.query(&stub, r#"{"make": "neq bmw"}"#, true).unwrap_err();
    assert!(matches!(err, StateError::TooManyResults { limit: 3 }));
    assert_eq!(err.code(), ErrorCode::ResultLimit);
}

// ── Test: malformed queries ──

#[test]
fn test_invalid_queries() {
    let state = cars_state();
    let stub = MemStub::with_defaults();

    for text in ["", "[]", "{}", "[{}]", "42", r#"{"make": "like ford"}"#, r#"{"make": "eq"}"#] {
        let err = state.query(&stub, text, true).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidQuery, "{:?}", text);
    }
}

// ── Test: query on an empty ledger ──

#[test]
fn test_empty_ledger() -> anyhow::Result<()> {
    let state = cars_state();
    let stub = MemStub::with_defaults();
    assert!(state.query(&stub, r#"{"make": "eq ford"}"#, true)?.is_empty());
    assert!(state.query(&stub, r#"{"make": "eq ford"}"#, false)?.is_empty());
    Ok(())
}

// ── Test: integers beyond f64 precision ──

#[test]
fn test_large_integer_fields_compare_exactly() -> anyhow::Result<()> {
    let state = IState::<Person>::new();
    let mut stub = MemStub::with_defaults();
    for id in [9_007_199_254_740_992_u64, 9_007_199_254_740_993, u64::MAX] {
        state.create_state(&mut stub, &person(id, "p", true))?;
    }
    stub.commit()?;

    let found = |text: &str| -> anyhow::Result<Vec<u64>> {
        Ok(state.query(&stub, text, true)?.into_iter().map(|p| p.id).collect())
    };
    assert_eq!(found(r#"{"id": "eq 9007199254740992"}"#)?, vec![9_007_199_254_740_992]);
    assert_eq!(found(r#"{"id": "eq 9007199254740993"}"#)?, vec![9_007_199_254_740_993]);
    // Results are ordered by primary key text.
    assert_eq!(
        found(r#"{"id": "gte 9007199254740993"}"#)?,
        vec![u64::MAX, 9_007_199_254_740_993]
    );
    assert!(found(r#"{"id": "eq 9007199254740994"}"#)?.is_empty());
    Ok(())
}

// ── Test: operands that cannot appear in a ledger key ──

#[test]
fn test_reserved_character_operand_is_not_an_error() -> anyhow::Result<()> {
    for state in states() {
        let stub = seeded(&state, &fleet());
        for text in [r#"{"make": "eq a\u0000b"}"#, r#"{"make": "eq z\udbff\udfff"}"#] {
            assert!(state.query(&stub, text, true)?.is_empty(), "{}", text);
            assert!(state.query(&stub, text, false)?.is_empty(), "{}", text);
        }
    }
    Ok(())
}
