//! `worldstate-primitives` — foundational types for ledger world state.
//!
//! This crate provides the key/value types and limits, stable error codes,
//! composite-key codec, transactional write overlay, and read-set records
//! shared by the stub and the state-access layer.

pub mod types;
pub mod error;
pub mod codec;
pub mod state;
pub mod rwset;

// Re-export commonly used types at the crate root for convenience.
pub use types::{
    Key, KeyValue, QueryMetadata, Value, Version, INDEX_NAMESPACE, MAX_KEY_LEN, MAX_PAGE_SIZE,
    MAX_VALUE_LEN,
};
pub use error::ErrorCode;
pub use codec::{CodecError, COMPOSITE_KEY_DELIMITER, MAX_UNICODE_RUNE};
pub use state::{OverlayResult, StateOverlay};
pub use rwset::{RangeRead, ReadSet};
