//! Chaincode transaction context.
//!
//! `ChaincodeStub` is the per-transaction handle the peer runtime hands to
//! chaincode. The state-access layer only ever talks to the ledger through
//! this trait, so it runs unchanged against `MemStub` in tests and against
//! a peer-backed implementation in production.
//!
//! Keys are strings. Range bounds are half-open `[start, end)` and an empty
//! bound is open on that side.

use worldstate_primitives::{codec, KeyValue, QueryMetadata, Value};

use crate::error::StubError;

/// Transaction context supplied by the ledger runtime.
///
/// Reads take `&self`, writes take `&mut self`. Implementations record
/// reads for endorsement validation.
pub trait ChaincodeStub {
    /// Identifier of the transaction this stub belongs to.
    fn tx_id(&self) -> &str;

    /// Read a value.
    ///
    /// Reads observe this transaction's earlier writes. Returns `Ok(None)`
    /// if the key does not exist.
    fn get_state(&self, key: &str) -> Result<Option<Value>, StubError>;

    /// All simple (non-composite) keys in `[start, end)`.
    ///
    /// The scan is recorded as a range read, so a key inserted into the
    /// range by a concurrent transaction invalidates this one.
    fn get_state_by_range(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StubError>;

    /// One page of simple keys in `[start, end)`, resuming after `bookmark`.
    ///
    /// Only allowed in read-only transactions.
    fn get_state_by_range_with_pagination(
        &self,
        start: &str,
        end: &str,
        page_size: u32,
        bookmark: &str,
    ) -> Result<(Vec<KeyValue>, QueryMetadata), StubError>;

    /// All composite keys extending `(object_type, attributes)`.
    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<Vec<KeyValue>, StubError>;

    /// One page of composite keys extending `(object_type, attributes)`.
    ///
    /// Only allowed in read-only transactions.
    fn get_state_by_partial_composite_key_with_pagination(
        &self,
        object_type: &str,
        attributes: &[&str],
        page_size: u32,
        bookmark: &str,
    ) -> Result<(Vec<KeyValue>, QueryMetadata), StubError>;

    /// Build a composite key.
    fn create_composite_key(&self, object_type: &str, attributes: &[&str]) -> Result<String, StubError> {
        Ok(codec::create_composite_key(object_type, attributes)?)
    }

    /// Split a composite key into its object type and attributes.
    fn split_composite_key(&self, key: &str) -> Result<(String, Vec<String>), StubError> {
        Ok(codec::split_composite_key(key)?)
    }

    /// Write a key-value pair to the transaction's write set.
    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), StubError>;

    /// Delete a key. Subsequent reads in this transaction return `None`.
    fn del_state(&mut self, key: &str) -> Result<(), StubError>;
}
