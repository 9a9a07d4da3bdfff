//! In-memory transaction context for tests and local execution.
//!
//! `MemStub` runs one transaction at a time against a committed
//! `StateStore`. Writes go to a `StateOverlay` and become visible to later
//! reads in the same transaction; `commit` applies them to the store at the
//! next height and opens a fresh transaction.
//!
//! Point reads that reach committed state are recorded in a `ReadSet` with
//! the version observed, and unpaginated range scans are recorded as
//! `RangeRead`s. Paginated scans are only permitted in read-only
//! transactions: once one runs, writes are rejected, and once a write is
//! buffered, paginated scans are rejected.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use tracing::trace;
use worldstate_primitives::{
    codec, Key, KeyValue, OverlayResult, QueryMetadata, RangeRead, ReadSet, StateOverlay, Value,
    Version,
};

use crate::error::StubError;
use crate::mem_store::MemStore;
use crate::state_store::StateStore;
use crate::traits::ChaincodeStub;
use crate::types::StubConfig;

/// Lowest key a simple-key range scan may start at.
///
/// Composite keys start with U+0000, so an open start bound is replaced by
/// U+0001 to keep them out of simple-key scans.
const EMPTY_KEY_SUBSTITUTE: &str = "\u{1}";

/// In-memory `ChaincodeStub` over a committed `StateStore`.
#[derive(Debug)]
pub struct MemStub<S: StateStore = MemStore> {
    /// Committed state.
    store: S,
    /// Write buffer for the current transaction.
    overlay: StateOverlay,
    /// Reads performed by the current transaction.
    read_set: RefCell<ReadSet>,
    /// Set once a paginated scan runs; the transaction is then read-only.
    paginated: Cell<bool>,
    tx_id: String,
    tx_seq: u64,
    config: StubConfig,
}

impl MemStub<MemStore> {
    /// An empty ledger with default limits.
    pub fn with_defaults() -> Self {
        Self::new(MemStore::new(), StubConfig::default())
    }
}

impl<S: StateStore> MemStub<S> {
    /// Open the first transaction against `store`.
    pub fn new(store: S, config: StubConfig) -> Self {
        Self {
            store,
            overlay: StateOverlay::new(),
            read_set: RefCell::new(ReadSet::new()),
            paginated: Cell::new(false),
            tx_id: tx_id_for(1),
            tx_seq: 1,
            config,
        }
    }

    /// Apply the current transaction's writes and open the next transaction.
    ///
    /// Returns the store height after the commit. A transaction with no
    /// writes leaves the height unchanged.
    pub fn commit(&mut self) -> Result<Version, StubError> {
        let writes = std::mem::take(&mut self.overlay).drain();
        if !writes.is_empty() {
            let version = self.store.height() + 1;
            let count = writes.len();
            self.store.apply(writes, version)?;
            trace!(tx_id = %self.tx_id, version, count, "committed transaction");
        }
        self.next_transaction();
        Ok(self.store.height())
    }

    /// Discard the current transaction's writes and open the next transaction.
    pub fn abort(&mut self) {
        trace!(tx_id = %self.tx_id, discarded = self.overlay.len(), "aborted transaction");
        self.overlay.clear();
        self.next_transaction();
    }

    fn next_transaction(&mut self) {
        self.read_set.borrow_mut().clear();
        self.paginated.set(false);
        self.tx_seq += 1;
        self.tx_id = tx_id_for(self.tx_seq);
    }

    /// Snapshot of the current transaction's reads.
    pub fn read_set(&self) -> ReadSet {
        self.read_set.borrow().clone()
    }

    /// The current transaction's buffered writes.
    pub fn overlay(&self) -> &StateOverlay {
        &self.overlay
    }

    /// Committed state.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the stub, dropping uncommitted writes.
    pub fn into_store(self) -> S {
        self.store
    }

    pub fn config(&self) -> &StubConfig {
        &self.config
    }

    /// True once a paginated scan has made this transaction read-only.
    pub fn is_read_only(&self) -> bool {
        self.paginated.get()
    }

    fn check_key(&self, key: &str) -> Result<(), StubError> {
        if key.is_empty() {
            return Err(StubError::invalid_key());
        }
        if key.len() > self.config.max_key_len {
            return Err(StubError::key_too_large());
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), StubError> {
        if self.paginated.get() {
            return Err(StubError::read_only_violation());
        }
        Ok(())
    }

    fn check_write_budget(&self, bytes: usize) -> Result<(), StubError> {
        let projected = self.overlay.total_write_bytes() + bytes as u64;
        if projected > self.config.max_write_bytes {
            return Err(StubError::write_limit());
        }
        Ok(())
    }

    /// Merged view of committed state and the overlay over `[start, end)`.
    fn scan(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StubError> {
        let mut merged: BTreeMap<Key, Value> = self
            .store
            .range(start, end)?
            .into_iter()
            .map(|(k, v)| (k, v.value))
            .collect();
        for (key, write) in self.overlay.range(start, end) {
            match write {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }
        Ok(merged
            .into_iter()
            .map(|(key, value)| KeyValue { key, value })
            .collect())
    }

    fn scan_recorded(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StubError> {
        let results = self.scan(start, end)?;
        self.read_set.borrow_mut().record_range(RangeRead {
            start: start.to_string(),
            end: end.to_string(),
            keys: results.iter().map(|kv| kv.key.clone()).collect(),
            exhausted: true,
        });
        trace!(tx_id = %self.tx_id, start, end, count = results.len(), "range scan");
        Ok(results)
    }

    fn scan_page(
        &self,
        start: &str,
        end: &str,
        page_size: u32,
        bookmark: &str,
    ) -> Result<(Vec<KeyValue>, QueryMetadata), StubError> {
        if !self.overlay.is_empty() {
            return Err(StubError::read_only_violation());
        }
        if page_size == 0 || page_size > self.config.max_page_size {
            return Err(StubError::page_limit());
        }
        self.paginated.set(true);

        let from = if !bookmark.is_empty() && bookmark > start {
            bookmark
        } else {
            start
        };
        let mut results = self.scan(from, end)?;
        let page_size = page_size as usize;
        let next = if results.len() > page_size {
            let next = results[page_size].key.clone();
            results.truncate(page_size);
            next
        } else {
            String::new()
        };
        trace!(tx_id = %self.tx_id, start = from, end, count = results.len(), "paginated scan");
        let metadata = QueryMetadata {
            fetched_records: results.len() as u32,
            bookmark: next,
        };
        Ok((results, metadata))
    }
}

fn tx_id_for(seq: u64) -> String {
    format!("tx-{:08}", seq)
}

/// Resolve simple-key range bounds, rejecting composite keys.
fn simple_range<'a>(start: &'a str, end: &'a str) -> Result<(&'a str, &'a str), StubError> {
    if codec::is_composite_key(start) || codec::is_composite_key(end) {
        return Err(StubError::invalid_key());
    }
    let start = if start.is_empty() {
        EMPTY_KEY_SUBSTITUTE
    } else {
        start
    };
    Ok((start, end))
}

impl<S: StateStore> ChaincodeStub for MemStub<S> {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn get_state(&self, key: &str) -> Result<Option<Value>, StubError> {
        self.check_key(key)?;
        trace!(tx_id = %self.tx_id, key, "get_state");
        match self.overlay.get(key) {
            OverlayResult::Found(value) => Ok(Some(value)),
            OverlayResult::Deleted => Ok(None),
            OverlayResult::NotInOverlay => {
                let entry = self.store.get(key)?;
                self.read_set
                    .borrow_mut()
                    .record_read(key, entry.as_ref().map(|e| e.version));
                Ok(entry.map(|e| e.value))
            }
        }
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StubError> {
        let (start, end) = simple_range(start, end)?;
        self.scan_recorded(start, end)
    }

    fn get_state_by_range_with_pagination(
        &self,
        start: &str,
        end: &str,
        page_size: u32,
        bookmark: &str,
    ) -> Result<(Vec<KeyValue>, QueryMetadata), StubError> {
        let (start, end) = simple_range(start, end)?;
        self.scan_page(start, end, page_size, bookmark)
    }

    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<Vec<KeyValue>, StubError> {
        let (start, end) = codec::partial_key_range(object_type, attributes)?;
        self.scan_recorded(&start, &end)
    }

    fn get_state_by_partial_composite_key_with_pagination(
        &self,
        object_type: &str,
        attributes: &[&str],
        page_size: u32,
        bookmark: &str,
    ) -> Result<(Vec<KeyValue>, QueryMetadata), StubError> {
        let (start, end) = codec::partial_key_range(object_type, attributes)?;
        self.scan_page(&start, &end, page_size, bookmark)
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StubError> {
        self.check_writable()?;
        self.check_key(key)?;
        if value.len() > self.config.max_value_len {
            return Err(StubError::value_too_large());
        }
        self.check_write_budget(key.len() + value.len())?;

        trace!(tx_id = %self.tx_id, key, len = value.len(), "put_state");
        self.overlay.set(key.to_string(), value.to_vec());
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<(), StubError> {
        self.check_writable()?;
        self.check_key(key)?;
        self.check_write_budget(key.len())?;

        trace!(tx_id = %self.tx_id, key, "del_state");
        self.overlay.delete(key.to_string());
        Ok(())
    }
}
