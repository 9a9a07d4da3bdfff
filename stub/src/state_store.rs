//! Committed world-state storage abstraction.
//!
//! `StateStore` is the state a transaction starts from. `MemStub` layers a
//! `StateOverlay` on top of it: reads check the overlay first, then fall
//! through to the store, and `commit` applies the overlay as one batch.

use std::collections::BTreeMap;

use worldstate_primitives::{Key, Value, Version};

use crate::error::StubError;

/// A committed value with the height that last wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub value: Value,
    pub version: Version,
}

/// Abstraction over committed world state.
///
/// Implementations must return range results in ascending key order.
pub trait StateStore: Send + Sync {
    /// Get the committed value and version for a key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<VersionedValue>, StubError>;

    /// Check if a key exists.
    ///
    /// Default implementation uses `get()`, but backends may optimize this.
    fn contains(&self, key: &str) -> Result<bool, StubError> {
        Ok(self.get(key)?.is_some())
    }

    /// All entries in `[start, end)`; empty bounds are open.
    fn range(&self, start: &str, end: &str) -> Result<Vec<(Key, VersionedValue)>, StubError>;

    /// Apply a batch of writes (`None` deletes) at `version`.
    fn apply(&mut self, writes: BTreeMap<Key, Option<Value>>, version: Version) -> Result<(), StubError>;

    /// Height of the last applied batch; 0 for a fresh store.
    fn height(&self) -> Version;
}
