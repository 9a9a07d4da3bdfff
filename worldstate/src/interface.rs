//! State-access interface.
//!
//! `StateInterface` is what chaincode logic programs against instead of the
//! raw key/value stub. Every call takes the transaction's stub explicitly,
//! so one implementation value can serve any number of transactions.

use serde_json::{Map, Value};
use worldstate_stub::ChaincodeStub;

use crate::error::StateError;
use crate::record::{PrimaryKey, Record};

/// CRUD and rich-query access to records of type `T`.
pub trait StateInterface<T: Record> {
    // ── Writes ──

    /// Persist a new record and its index entries.
    ///
    /// Does not check for an existing record under the same key. Creating
    /// over an existing record replaces it but leaves the old record's
    /// index entries in place until the next update, delete or index
    /// compaction.
    fn create_state(&self, stub: &mut dyn ChaincodeStub, record: &T) -> Result<(), StateError>;

    /// Overwrite a record in full.
    ///
    /// Does not require the record to exist. The previous value, if any,
    /// is read only to retire its index entries.
    fn update_state(&self, stub: &mut dyn ChaincodeStub, record: &T) -> Result<(), StateError>;

    /// Set individual fields of an existing record.
    ///
    /// `fields` maps field paths (dotted for nested fields) to new values.
    /// Fails with [`StateError::NotFound`] if no record is stored under
    /// `primary_key`, and with [`StateError::PrimaryKeyChanged`] if the
    /// update would move the record to another key.
    fn partial_update_state(
        &self,
        stub: &mut dyn ChaincodeStub,
        primary_key: &PrimaryKey,
        fields: &Map<String, Value>,
    ) -> Result<(), StateError>;

    /// Remove a record and its index entries. Deleting an absent record
    /// succeeds.
    fn delete_state(
        &self,
        stub: &mut dyn ChaincodeStub,
        primary_key: &PrimaryKey,
    ) -> Result<(), StateError>;

    // ── Reads ──

    /// Read a record. Returns `Ok(None)` if it does not exist.
    fn read_state(
        &self,
        stub: &dyn ChaincodeStub,
        primary_key: &PrimaryKey,
    ) -> Result<Option<T>, StateError>;

    /// Run a rich query over records of type `T`, ordered by primary key.
    ///
    /// With `is_invoke` set the query uses tracked scans: everything it
    /// reads enters the transaction's read set and it sees the
    /// transaction's own pending writes. Without it the query is a
    /// read-only evaluation using paginated scans, which the ledger only
    /// allows in transactions that write nothing.
    fn query(
        &self,
        stub: &dyn ChaincodeStub,
        query: &str,
        is_invoke: bool,
    ) -> Result<Vec<T>, StateError>;
}
