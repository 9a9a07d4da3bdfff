//! `worldstate-stub` — the chaincode transaction context and an in-memory ledger.
//!
//! This crate defines the ledger-side interface the state-access layer is
//! built on. It provides:
//!
//! - `ChaincodeStub` trait — per-transaction ledger access (point reads,
//!   writes, range and composite-key scans, pagination)
//! - `StateStore` trait — committed world-state abstraction
//! - `MemStore` — in-memory `StateStore`
//! - `MemStub` — in-memory `ChaincodeStub` with a write overlay, read-set
//!   recording, and commit/abort
//! - `StubConfig` — per-transaction resource limits
//! - `StubError` — stub error type with `ErrorCode` conversion

pub mod error;
pub mod types;
pub mod state_store;
pub mod mem_store;
pub mod traits;
pub mod mem_stub;

// Re-export commonly used types at the crate root.
pub use error::StubError;
pub use types::StubConfig;
pub use state_store::{StateStore, VersionedValue};
pub use mem_store::MemStore;
pub use traits::ChaincodeStub;
pub use mem_stub::MemStub;
