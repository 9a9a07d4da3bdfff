//! Transactional write overlay for world state.
//!
//! The overlay buffers a transaction's writes and makes them visible to
//! subsequent reads within the same transaction. On commit the buffered
//! writes are applied to committed state in one batch; on abort they are
//! discarded.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::types::{Key, Value};

/// Transactional write buffer overlaying committed state.
///
/// Uses `BTreeMap` so range scans and drains iterate in key order.
#[derive(Debug, Clone, Default)]
pub struct StateOverlay {
    /// Buffered writes: key → Some(value) for puts, key → None for deletions.
    writes: BTreeMap<Key, Option<Value>>,
    /// Total bytes written (keys + values) for enforcing the write budget.
    total_write_bytes: u64,
}

/// Result of looking up a key in the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayResult {
    /// Key was written in the overlay with this value.
    Found(Value),
    /// Key was deleted in this overlay.
    Deleted,
    /// Key is untouched; caller must check committed state.
    NotInOverlay,
}

impl StateOverlay {
    /// Create a new empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    fn retire(&mut self, key: &str) {
        if let Some(prev) = self.writes.get(key) {
            let prev_bytes = key.len() as u64 + prev.as_ref().map_or(0, |v| v.len() as u64);
            self.total_write_bytes = self.total_write_bytes.saturating_sub(prev_bytes);
        }
    }

    /// Put a key-value pair, replacing any earlier entry for the key.
    pub fn set(&mut self, key: Key, value: Value) {
        self.retire(&key);
        let new_bytes = (key.len() + value.len()) as u64;
        self.total_write_bytes = self.total_write_bytes.saturating_add(new_bytes);
        self.writes.insert(key, Some(value));
    }

    /// Mark a key as deleted.
    ///
    /// Deletion still counts the key bytes toward the write budget.
    pub fn delete(&mut self, key: Key) {
        self.retire(&key);
        self.total_write_bytes = self.total_write_bytes.saturating_add(key.len() as u64);
        self.writes.insert(key, None);
    }

    /// Look up a key in the overlay.
    pub fn get(&self, key: &str) -> OverlayResult {
        match self.writes.get(key) {
            Some(Some(value)) => OverlayResult::Found(value.clone()),
            Some(None) => OverlayResult::Deleted,
            None => OverlayResult::NotInOverlay,
        }
    }

    /// Returns true if the overlay has any entry (put or delete) for this key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.writes.contains_key(key)
    }

    /// Entries in `[start, end)` in key order. Empty bounds are open.
    pub fn range<'a>(
        &'a self,
        start: &'a str,
        end: &'a str,
    ) -> Box<dyn Iterator<Item = (&'a Key, &'a Option<Value>)> + 'a> {
        if !start.is_empty() && !end.is_empty() && start > end {
            return Box::new(std::iter::empty());
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
        Box::new(self.writes.range::<str, _>((lower, upper)))
    }

    /// Consume the overlay and return all buffered writes in key order.
    pub fn drain(self) -> BTreeMap<Key, Option<Value>> {
        self.writes
    }

    /// Borrow the buffered writes.
    pub fn writes(&self) -> &BTreeMap<Key, Option<Value>> {
        &self.writes
    }

    /// Discard all buffered writes.
    pub fn clear(&mut self) {
        self.writes.clear();
        self.total_write_bytes = 0;
    }

    /// Number of keys touched (put or deleted).
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Total bytes written (keys + values).
    pub fn total_write_bytes(&self) -> u64 {
        self.total_write_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_set_and_get() {
        let mut overlay = StateOverlay::new();
        overlay.set("key1".into(), b"value1".to_vec());
        assert_eq!(overlay.get("key1"), OverlayResult::Found(b"value1".to_vec()));
        assert_eq!(overlay.get("missing"), OverlayResult::NotInOverlay);
    }

    #[test]
    fn test_overlay_delete_then_set() {
        let mut overlay = StateOverlay::new();
        overlay.set("key1".into(), b"v".to_vec());
        overlay.delete("key1".into());
        assert_eq!(overlay.get("key1"), OverlayResult::Deleted);

        overlay.set("key1".into(), b"new".to_vec());
        assert_eq!(overlay.get("key1"), OverlayResult::Found(b"new".to_vec()));
    }

    #[test]
    fn test_overlay_drain_order() {
        let mut overlay = StateOverlay::new();
        overlay.set("c".into(), b"3".to_vec());
        overlay.set("a".into(), b"1".to_vec());
        overlay.delete("d".into());
        overlay.set("b".into(), b"2".to_vec());

        let writes = overlay.drain();
        let keys: Vec<&str> = writes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
        assert_eq!(writes["d"], None);
    }

    #[test]
    fn test_overlay_range() {
        let mut overlay = StateOverlay::new();
        for k in ["a", "b", "c", "d"] {
            overlay.set(k.into(), k.as_bytes().to_vec());
        }
        overlay.delete("c".into());

        let keys: Vec<&str> = overlay.range("b", "d").map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "c"]);

        let open: Vec<&str> = overlay.range("", "").map(|(k, _)| k.as_str()).collect();
        assert_eq!(open, vec!["a", "b", "c", "d"]);

        let tail: Vec<&str> = overlay.range("c", "").map(|(k, _)| k.as_str()).collect();
        assert_eq!(tail, vec!["c", "d"]);
    }

    #[test]
    fn test_overlay_total_write_bytes() {
        let mut overlay = StateOverlay::new();
        // "key1" (4) + "value1" (6) = 10
        overlay.set("key1".into(), b"value1".to_vec());
        assert_eq!(overlay.total_write_bytes(), 10);

        // overwrite: subtract 10, add "key1" (4) + "v" (1)
        overlay.set("key1".into(), b"v".to_vec());
        assert_eq!(overlay.total_write_bytes(), 5);

        // delete counts key bytes only
        overlay.delete("key1".into());
        assert_eq!(overlay.total_write_bytes(), 4);
    }

    #[test]
    fn test_overlay_clear() {
        let mut overlay = StateOverlay::new();
        overlay.set("key1".into(), b"value1".to_vec());
        overlay.delete("key2".into());
        assert_eq!(overlay.len(), 2);
        assert!(overlay.contains_key("key2"));

        overlay.clear();
        assert!(overlay.is_empty());
        assert_eq!(overlay.total_write_bytes(), 0);
    }
}
