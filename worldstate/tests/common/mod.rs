//! Shared fixtures for integration tests.
//!
//! Provides two record types, a seeded ledger factory and small helpers
//! for building partial-update payloads.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use worldstate::{IState, IStateConfig, PrimaryKey, Record, StateInterface};
use worldstate_stub::MemStub;

// ── Records ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    pub age: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: String,
    pub make: String,
    pub color: String,
    pub price: f64,
    pub owner: Owner,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Record for Car {
    const DOC_TYPE: &'static str = "car";

    fn primary_key(&self) -> PrimaryKey {
        PrimaryKey::from(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
    pub active: bool,
}

impl Record for Person {
    const DOC_TYPE: &'static str = "person";

    fn primary_key(&self) -> PrimaryKey {
        PrimaryKey::from(self.id)
    }
}

// ── Builders ──

pub fn car(id: &str, make: &str, color: &str, price: f64, owner: &str) -> Car {
    Car {
        id: id.to_string(),
        make: make.to_string(),
        color: color.to_string(),
        price,
        owner: Owner {
            name: owner.to_string(),
            age: 30,
        },
        tags: Vec::new(),
    }
}

pub fn person(id: u64, name: &str, active: bool) -> Person {
    Person {
        id,
        name: name.to_string(),
        active,
    }
}

/// The standard fleet used by query tests.
pub fn fleet() -> Vec<Car> {
    vec![
        car("CAR0", "toyota", "blue", 18_500.0, "ann"),
        car("CAR1", "ford", "red", 9_999.99, "bob"),
        car("CAR2", "toyota", "red", 23_000.0, "cara"),
        car("CAR3", "tesla", "white", 41_000.0, "dan"),
        car("CAR4", "ford", "black", -1.0, "ann"),
    ]
}

/// A ledger with `cars` committed through `state`.
pub fn seeded(state: &IState<Car>, cars: &[Car]) -> MemStub {
    let mut stub = MemStub::with_defaults();
    for car in cars {
        state.create_state(&mut stub, car).unwrap();
    }
    stub.commit().unwrap();
    stub
}

pub fn cars_state() -> IState<Car> {
    IState::new()
}

pub fn cars_state_with(config: IStateConfig) -> IState<Car> {
    IState::with_config(config).unwrap()
}

/// Partial-update payload from a JSON object literal.
pub fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

pub fn ids(cars: &[Car]) -> Vec<&str> {
    cars.iter().map(|c| c.id.as_str()).collect()
}

/// Number of index entries stored for `doc_type`.
pub fn index_entry_count(stub: &MemStub, doc_type: &str) -> usize {
    use worldstate_primitives::INDEX_NAMESPACE;
    use worldstate_stub::ChaincodeStub;

    stub.get_state_by_partial_composite_key(INDEX_NAMESPACE, &[doc_type])
        .unwrap()
        .len()
}
