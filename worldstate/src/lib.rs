//! `worldstate` — CRUD and rich-query state access for ledger chaincode.
//!
//! Chaincode logic works with typed records instead of raw ledger keys:
//! `f(stub, record | primary_key | query) → Result<…, StateError>`
//!
//! Records are JSON documents stored under composite keys, with secondary
//! index entries kept in world state so queries can avoid full scans.
//!
//! ## Architecture
//!
//! - [`interface::StateInterface`] — the six state operations
//! - [`istate::IState`] — index-backed implementation
//! - [`record::Record`] — trait implemented by chaincode record types
//! - [`index`] — index entry layout and maintenance
//! - [`query`] — query language, filtering and planning
//! - [`merge`] — partial-update field merge
//! - [`config::IStateConfig`] — indexed fields and query limits
//! - [`error::StateError`] — errors with `ErrorCode` mapping

pub mod config;
pub mod error;
pub mod index;
pub mod interface;
pub mod istate;
pub mod merge;
pub mod query;
pub mod record;
pub mod value;

// Re-export key types for convenience
pub use config::IStateConfig;
pub use error::StateError;
pub use interface::StateInterface;
pub use istate::IState;
pub use query::{Query, QueryError, QueryMode};
pub use record::{PrimaryKey, Record};
