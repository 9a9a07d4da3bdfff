//! Secondary indexes kept in world state.
//!
//! Every indexed scalar of a record gets one composite-key entry:
//!
//! ```text
//! (INDEX_NAMESPACE, [doc_type, field_path, encoded_value, primary_key]) → 0x00
//! ```
//!
//! Entries sort by field, then value, then primary key, so an equality
//! lookup is a partial-key scan on `[doc_type, field, encoded_value]` and a
//! field scan is a partial-key scan on `[doc_type, field]`.
//!
//! Values use the encoding in [`crate::value`]. Long strings and strings
//! holding a key delimiter become digests, so every scalar forms a key.

use std::collections::BTreeSet;

use serde_json::Value;
use worldstate_primitives::INDEX_NAMESPACE;
use worldstate_stub::ChaincodeStub;

use crate::config::IStateConfig;
use crate::error::StateError;
use crate::value::flatten;

/// Stored value of an index entry. Ledgers treat an empty value as a
/// delete, so entries carry one byte.
pub const INDEX_MARKER: &[u8] = &[0];

/// One `(field_path, encoded_value)` pair of a record.
pub type IndexTerm = (String, String);

/// A decoded index entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: String,
    pub field: String,
    pub encoded: String,
    pub primary_key: String,
}

/// The index terms `doc` should have under `config`.
pub fn terms_for(doc: &Value, config: &IStateConfig) -> BTreeSet<IndexTerm> {
    flatten(doc)
        .into_iter()
        .filter(|(path, _)| config.is_indexed(path))
        .map(|(path, scalar)| (path, scalar.encode()))
        .collect()
}

/// Ledger key of one index entry.
pub fn entry_key(
    stub: &dyn ChaincodeStub,
    doc_type: &str,
    primary_key: &str,
    (field, encoded): &IndexTerm,
) -> Result<String, StateError> {
    Ok(stub.create_composite_key(INDEX_NAMESPACE, &[doc_type, field, encoded, primary_key])?)
}

fn entry_keys<'t>(
    stub: &dyn ChaincodeStub,
    doc_type: &str,
    primary_key: &str,
    terms: impl IntoIterator<Item = &'t IndexTerm>,
) -> Result<Vec<String>, StateError> {
    terms
        .into_iter()
        .map(|term| entry_key(stub, doc_type, primary_key, term))
        .collect()
}

/// Decode an index entry key.
pub fn parse_entry(stub: &dyn ChaincodeStub, key: &str) -> Result<IndexEntry, StateError> {
    let (namespace, attrs) = stub.split_composite_key(key)?;
    match attrs.as_slice() {
        [_, field, encoded, primary_key] if namespace == INDEX_NAMESPACE => Ok(IndexEntry {
            key: key.to_string(),
            field: field.clone(),
            encoded: encoded.clone(),
            primary_key: primary_key.clone(),
        }),
        _ => Err(StateError::CorruptIndex(key.to_string())),
    }
}

/// The index writes that move one record from `old` to `new`.
///
/// Every entry key is built when the diff is computed, so a key that
/// cannot be formed fails before anything is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexDiff {
    put: Vec<String>,
    delete: Vec<String>,
}

impl IndexDiff {
    pub fn between(
        stub: &dyn ChaincodeStub,
        doc_type: &str,
        primary_key: &str,
        old: Option<&Value>,
        new: Option<&Value>,
        config: &IStateConfig,
    ) -> Result<Self, StateError> {
        let old_terms = old.map(|d| terms_for(d, config)).unwrap_or_default();
        let new_terms = new.map(|d| terms_for(d, config)).unwrap_or_default();

        Ok(Self {
            delete: entry_keys(stub, doc_type, primary_key, old_terms.difference(&new_terms))?,
            put: entry_keys(stub, doc_type, primary_key, new_terms.difference(&old_terms))?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.put.is_empty() && self.delete.is_empty()
    }

    /// Write the diff. Returns `(added, removed)`.
    pub fn apply(self, stub: &mut dyn ChaincodeStub) -> Result<(usize, usize), StateError> {
        for key in &self.delete {
            stub.del_state(key)?;
        }
        for key in &self.put {
            stub.put_state(key, INDEX_MARKER)?;
        }
        Ok((self.put.len(), self.delete.len()))
    }
}

/// Bring the index of one record from `old` to `new`.
///
/// Only the difference is written: terms that disappear are deleted and
/// terms that appear are added. Returns `(added, removed)`.
pub fn reindex(
    stub: &mut dyn ChaincodeStub,
    doc_type: &str,
    primary_key: &str,
    old: Option<&Value>,
    new: Option<&Value>,
    config: &IStateConfig,
) -> Result<(usize, usize), StateError> {
    IndexDiff::between(stub, doc_type, primary_key, old, new, config)?.apply(stub)
}
