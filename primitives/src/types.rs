//! Core type aliases and constants for ledger world state.
//!
//! These types are shared by the stub, the in-memory ledger, and the
//! state-access layer.

/// A world-state key. Ledger keys are UTF-8 strings; composite keys embed
/// U+0000 delimiters.
pub type Key = String;

/// A raw world-state value.
pub type Value = Vec<u8>;

/// Commit height at which a key was last written.
pub type Version = u64;

/// Maximum key length in bytes.
pub const MAX_KEY_LEN: usize = 1024;

/// Maximum value length in bytes.
pub const MAX_VALUE_LEN: usize = 1024 * 1024; // 1 MiB

/// Maximum number of results a single paginated scan may return.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Namespace (object type) under which secondary index entries live.
pub const INDEX_NAMESPACE: &str = "\u{1}idx";

/// A key/value pair returned by range scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: Key,
    pub value: Value,
}

impl KeyValue {
    pub fn new(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Metadata returned alongside a page of results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMetadata {
    /// Number of records in this page.
    pub fetched_records: u32,
    /// Key to resume from; empty when the scan is exhausted.
    pub bookmark: Key,
}

impl QueryMetadata {
    /// Returns true if no further pages remain.
    pub fn is_exhausted(&self) -> bool {
        self.bookmark.is_empty()
    }
}

/// Returns true if `key` falls in the half-open range `[start, end)`.
///
/// An empty `start` or `end` leaves that side of the range open.
pub fn in_range(key: &str, start: &str, end: &str) -> bool {
    (start.is_empty() || key >= start) && (end.is_empty() || key < end)
}
