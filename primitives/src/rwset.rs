//! Read-set records for a single transaction.
//!
//! Every point read records the committed version it observed, and every
//! range scan records its bounds plus the keys it returned. Validation
//! replays both against the state at commit time: a changed version is an
//! MVCC conflict, and a changed key list in a recorded range is a phantom.

use std::collections::BTreeMap;

use crate::types::{Key, Version};

/// A recorded range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRead {
    /// Inclusive start key; empty means open.
    pub start: Key,
    /// Exclusive end key; empty means open.
    pub end: Key,
    /// Keys returned, in order.
    pub keys: Vec<Key>,
    /// False when the scan stopped early (e.g. at a page boundary).
    pub exhausted: bool,
}

/// Keys and ranges a transaction has read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadSet {
    /// key → committed version observed (`None` if the key was absent).
    reads: BTreeMap<Key, Option<Version>>,
    ranges: Vec<RangeRead>,
}

impl ReadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a point read. The first observation of a key wins.
    pub fn record_read(&mut self, key: &str, version: Option<Version>) {
        if !self.reads.contains_key(key) {
            self.reads.insert(key.to_string(), version);
        }
    }

    /// Record a range scan.
    pub fn record_range(&mut self, range: RangeRead) {
        self.ranges.push(range);
    }

    /// Version observed for `key`, if it was read.
    ///
    /// The outer `Option` is whether the key was read at all.
    pub fn version_of(&self, key: &str) -> Option<Option<Version>> {
        self.reads.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.reads.contains_key(key)
    }

    pub fn reads(&self) -> &BTreeMap<Key, Option<Version>> {
        &self.reads
    }

    pub fn ranges(&self) -> &[RangeRead] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty() && self.ranges.is_empty()
    }

    pub fn clear(&mut self) {
        self.reads.clear();
        self.ranges.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_read_wins() {
        let mut rs = ReadSet::new();
        rs.record_read("k", Some(3));
        rs.record_read("k", Some(7));
        assert_eq!(rs.version_of("k"), Some(Some(3)));
    }

    #[test]
    fn test_absent_key_read() {
        let mut rs = ReadSet::new();
        rs.record_read("missing", None);
        assert!(rs.contains("missing"));
        assert_eq!(rs.version_of("missing"), Some(None));
        assert_eq!(rs.version_of("other"), None);
    }

    #[test]
    fn test_ranges_and_clear() {
        let mut rs = ReadSet::new();
        assert!(rs.is_empty());

        rs.record_range(RangeRead {
            start: "a".into(),
            end: "c".into(),
            keys: vec!["a".into(), "b".into()],
            exhausted: true,
        });
        assert_eq!(rs.ranges().len(), 1);
        assert!(!rs.is_empty());

        rs.clear();
        assert!(rs.is_empty());
    }
}
