//! In-memory committed world state.
//!
//! `MemStore` implements `StateStore` using a `BTreeMap` for ordered key
//! iteration. Used by `MemStub` and by tests that do not need a real
//! ledger backend.

use std::collections::BTreeMap;
use std::ops::Bound;

use worldstate_primitives::{Key, Value, Version};

use crate::error::StubError;
use crate::state_store::{StateStore, VersionedValue};

/// In-memory state store backed by `BTreeMap`.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    data: BTreeMap<Key, VersionedValue>,
    height: Version,
}

impl MemStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated at version 0.
    pub fn with_data(data: BTreeMap<Key, Value>) -> Self {
        let data = data
            .into_iter()
            .map(|(k, value)| (k, VersionedValue { value, version: 0 }))
            .collect();
        Self { data, height: 0 }
    }

    /// Insert a key-value pair at the current height.
    pub fn insert(&mut self, key: impl Into<Key>, value: Value) {
        let version = self.height;
        self.data.insert(key.into(), VersionedValue { value, version });
    }

    /// Remove a key from the store.
    pub fn remove(&mut self, key: &str) {
        self.data.remove(key);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.data.keys()
    }

    /// BLAKE3 digest over every key/value pair in key order.
    ///
    /// Each entry is hashed as `len(key) || key || len(value) || value`
    /// with u64 little-endian lengths. Versions are excluded, so two stores
    /// holding the same contents digest equal regardless of history.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        for (key, entry) in &self.data {
            hasher.update(&(key.len() as u64).to_le_bytes());
            hasher.update(key.as_bytes());
            hasher.update(&(entry.value.len() as u64).to_le_bytes());
            hasher.update(&entry.value);
        }
        *hasher.finalize().as_bytes()
    }
}

impl StateStore for MemStore {
    fn get(&self, key: &str) -> Result<Option<VersionedValue>, StubError> {
        Ok(self.data.get(key).cloned())
    }

    fn contains(&self, key: &str) -> Result<bool, StubError> {
        Ok(self.data.contains_key(key))
    }

    fn range(&self, start: &str, end: &str) -> Result<Vec<(Key, VersionedValue)>, StubError> {
        if !start.is_empty() && !end.is_empty() && start > end {
            return Ok(Vec::new());
        }
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start)
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end)
        };
        Ok(self
            .data
            .range::<str, _>((lower, upper))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn apply(&mut self, writes: BTreeMap<Key, Option<Value>>, version: Version) -> Result<(), StubError> {
        if version <= self.height {
            return Err(StubError::Internal(format!(
                "batch version {} is not above store height {}",
                version, self.height
            )));
        }
        for (key, value) in writes {
            match value {
                Some(value) => {
                    self.data.insert(key, VersionedValue { value, version });
                }
                None => {
                    self.data.remove(&key);
                }
            }
        }
        self.height = version;
        Ok(())
    }

    fn height(&self) -> Version {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = MemStore::new();
        assert!(store.is_empty());
        assert_eq!(store.height(), 0);
        assert_eq!(store.get("missing").unwrap(), None);
        assert!(!store.contains("missing").unwrap());
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = MemStore::new();
        store.insert("key1", b"value1".to_vec());

        let entry = store.get("key1").unwrap().unwrap();
        assert_eq!(entry.value, b"value1");
        assert_eq!(entry.version, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_with_data() {
        let mut data = BTreeMap::new();
        data.insert("a".to_string(), b"1".to_vec());
        data.insert("b".to_string(), b"2".to_vec());

        let store = MemStore::with_data(data);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b").unwrap().unwrap().value, b"2");
    }

    #[test]
    fn test_range_order_and_bounds() {
        let mut store = MemStore::new();
        for k in ["d", "a", "c", "b"] {
            store.insert(k, k.as_bytes().to_vec());
        }

        let keys: Vec<Key> = store.range("b", "d").unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "c"]);

        let all = store.range("", "").unwrap();
        assert_eq!(all.len(), 4);

        assert!(store.range("d", "a").unwrap().is_empty());
    }

    #[test]
    fn test_apply_batch_sets_versions() {
        let mut store = MemStore::new();
        store.insert("old", b"x".to_vec());

        let mut batch = BTreeMap::new();
        batch.insert("new".to_string(), Some(b"y".to_vec()));
        batch.insert("old".to_string(), None);
        store.apply(batch, 1).unwrap();

        assert_eq!(store.height(), 1);
        assert_eq!(store.get("old").unwrap(), None);
        assert_eq!(store.get("new").unwrap().unwrap().version, 1);
    }

    #[test]
    fn test_apply_rejects_stale_version() {
        let mut store = MemStore::new();
        store.apply(BTreeMap::new(), 3).unwrap();
        let err = store.apply(BTreeMap::new(), 3).unwrap_err();
        assert!(matches!(err, StubError::Internal(_)));
    }

    #[test]
    fn test_digest_tracks_contents_not_versions() {
        let mut a = MemStore::new();
        a.insert("k", b"v".to_vec());

        let mut b = MemStore::new();
        let mut batch = BTreeMap::new();
        batch.insert("k".to_string(), Some(b"v".to_vec()));
        b.apply(batch, 5).unwrap();

        assert_eq!(a.digest(), b.digest());

        b.insert("k2", Vec::new());
        assert_ne!(a.digest(), b.digest());
    }
}
