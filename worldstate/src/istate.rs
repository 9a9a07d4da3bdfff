//! `IState`: the index-backed `StateInterface` implementation.
//!
//! Records are stored as JSON documents under `(T::DOC_TYPE, [primary_key])`
//! and every indexed scalar field gets an index entry (see [`crate::index`]).
//! Writes keep the index in step with the document:
//!
//! - create writes the document and its entries without reading first
//! - update, partial update and delete read the previous document and
//!   write only the index difference
//! - `compact_index` removes entries a blind create left behind
//! - `rebuild_index` also adds entries missing under the current config
//!
//! Every index key is built before the first write of an operation.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::marker::PhantomData;

use serde_json::{Map, Value};
use tracing::debug;
use worldstate_primitives::INDEX_NAMESPACE;
use worldstate_stub::ChaincodeStub;

use crate::config::IStateConfig;
use crate::error::StateError;
use crate::index::{entry_key, parse_entry, terms_for, IndexDiff, IndexTerm, INDEX_MARKER};
use crate::interface::StateInterface;
use crate::merge::apply_partial;
use crate::query::{Executor, Query, QueryMode};
use crate::record::{record_key, PrimaryKey, Record};
use crate::value::find_dotted_key;

/// Index-backed state access for records of type `T`.
pub struct IState<T> {
    config: IStateConfig,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> IState<T> {
    /// An instance with the default configuration: every scalar field is
    /// indexed.
    pub fn new() -> Self {
        Self {
            config: IStateConfig::default(),
            _record: PhantomData,
        }
    }

    /// An instance with a validated configuration.
    pub fn with_config(config: IStateConfig) -> Result<Self, StateError> {
        config.validate()?;
        Ok(Self {
            config,
            _record: PhantomData,
        })
    }

    pub fn config(&self) -> &IStateConfig {
        &self.config
    }

    /// Delete index entries that no longer describe the stored record.
    ///
    /// Covers entries of deleted records, entries for values a record no
    /// longer holds and entries for fields that are no longer indexed.
    /// Returns the number of entries removed.
    pub fn compact_index(&self, stub: &mut dyn ChaincodeStub) -> Result<usize, StateError> {
        let entries = stub.get_state_by_partial_composite_key(INDEX_NAMESPACE, &[T::DOC_TYPE])?;
        let mut live: HashMap<String, BTreeSet<IndexTerm>> = HashMap::new();
        let mut removed = 0;

        for kv in entries {
            let entry = parse_entry(stub, &kv.key)?;
            if !live.contains_key(&entry.primary_key) {
                let terms = match load(stub, T::DOC_TYPE, &entry.primary_key)? {
                    Some(doc) => terms_for(&doc, &self.config),
                    None => BTreeSet::new(),
                };
                live.insert(entry.primary_key.clone(), terms);
            }
            let keep = live
                .get(&entry.primary_key)
                .is_some_and(|terms| terms.contains(&(entry.field.clone(), entry.encoded.clone())));
            if !keep {
                stub.del_state(&entry.key)?;
                removed += 1;
            }
        }

        debug!(doc_type = T::DOC_TYPE, removed, "compacted index");
        Ok(removed)
    }

    /// Bring the index of every stored record in line with the config.
    ///
    /// Compacts first, then writes the entries that are missing, such as
    /// those of a field added to `indexed_fields` after its records were
    /// stored. Queries through a widened config miss those records until
    /// this runs. Returns `(added, removed)`.
    pub fn rebuild_index(
        &self,
        stub: &mut dyn ChaincodeStub,
    ) -> Result<(usize, usize), StateError> {
        let removed = self.compact_index(stub)?;
        let present: BTreeSet<String> = stub
            .get_state_by_partial_composite_key(INDEX_NAMESPACE, &[T::DOC_TYPE])?
            .into_iter()
            .map(|kv| kv.key)
            .collect();

        let mut missing = Vec::new();
        for kv in stub.get_state_by_partial_composite_key(T::DOC_TYPE, &[])? {
            let (_, attrs) = stub.split_composite_key(&kv.key)?;
            let [primary_key] = attrs.as_slice() else {
                continue;
            };
            let doc: Value = serde_json::from_slice(&kv.value)?;
            for term in terms_for(&doc, &self.config) {
                let key = entry_key(stub, T::DOC_TYPE, primary_key, &term)?;
                if !present.contains(&key) {
                    missing.push(key);
                }
            }
        }
        for key in &missing {
            stub.put_state(key, INDEX_MARKER)?;
        }

        debug!(doc_type = T::DOC_TYPE, added = missing.len(), removed, "rebuilt index");
        Ok((missing.len(), removed))
    }

    /// Serialize `record` into its key and JSON document.
    fn document(record: &T) -> Result<(PrimaryKey, Value), StateError> {
        let primary_key = record.primary_key();
        primary_key.validate()?;
        let doc = serde_json::to_value(record)?;
        if !doc.is_object() {
            return Err(StateError::NotAnObject {
                doc_type: T::DOC_TYPE,
            });
        }
        if let Some(field) = find_dotted_key(&doc) {
            return Err(StateError::DottedFieldName {
                doc_type: T::DOC_TYPE,
                field: field.to_string(),
            });
        }
        Ok((primary_key, doc))
    }

    /// Write `doc` and move its index entries on from `old`.
    fn store(
        &self,
        stub: &mut dyn ChaincodeStub,
        primary_key: &PrimaryKey,
        old: Option<&Value>,
        doc: &Value,
    ) -> Result<(), StateError> {
        let key = record_key(stub, T::DOC_TYPE, primary_key.as_str())?;
        let bytes = serde_json::to_vec(doc)?;
        let diff = IndexDiff::between(
            stub,
            T::DOC_TYPE,
            primary_key.as_str(),
            old,
            Some(doc),
            &self.config,
        )?;
        stub.put_state(&key, &bytes)?;
        let (added, removed) = diff.apply(stub)?;
        debug!(
            tx_id = stub.tx_id(),
            doc_type = T::DOC_TYPE,
            primary_key = %primary_key,
            added,
            removed,
            "stored state"
        );
        Ok(())
    }
}

fn load(
    stub: &dyn ChaincodeStub,
    doc_type: &str,
    primary_key: &str,
) -> Result<Option<Value>, StateError> {
    let key = record_key(stub, doc_type, primary_key)?;
    match stub.get_state(&key)? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

impl<T: Record> StateInterface<T> for IState<T> {
    fn create_state(&self, stub: &mut dyn ChaincodeStub, record: &T) -> Result<(), StateError> {
        let (primary_key, doc) = Self::document(record)?;
        self.store(stub, &primary_key, None, &doc)
    }

    fn update_state(&self, stub: &mut dyn ChaincodeStub, record: &T) -> Result<(), StateError> {
        let (primary_key, doc) = Self::document(record)?;
        let old = load(stub, T::DOC_TYPE, primary_key.as_str())?;
        self.store(stub, &primary_key, old.as_ref(), &doc)
    }

    fn partial_update_state(
        &self,
        stub: &mut dyn ChaincodeStub,
        primary_key: &PrimaryKey,
        fields: &Map<String, Value>,
    ) -> Result<(), StateError> {
        primary_key.validate()?;
        let old = load(stub, T::DOC_TYPE, primary_key.as_str())?.ok_or_else(|| {
            StateError::NotFound {
                doc_type: T::DOC_TYPE,
                key: primary_key.to_string(),
            }
        })?;
        let Value::Object(mut merged) = old.clone() else {
            return Err(StateError::NotAnObject {
                doc_type: T::DOC_TYPE,
            });
        };
        apply_partial(&mut merged, fields)?;

        // Round-trip through `T` so the stored document stays a valid record.
        let record: T = serde_json::from_value(Value::Object(merged))?;
        let (new_key, doc) = Self::document(&record)?;
        if new_key != *primary_key {
            return Err(StateError::PrimaryKeyChanged {
                from: primary_key.to_string(),
                to: new_key.into_string(),
            });
        }
        self.store(stub, primary_key, Some(&old), &doc)
    }

    fn delete_state(
        &self,
        stub: &mut dyn ChaincodeStub,
        primary_key: &PrimaryKey,
    ) -> Result<(), StateError> {
        primary_key.validate()?;
        let Some(old) = load(stub, T::DOC_TYPE, primary_key.as_str())? else {
            debug!(doc_type = T::DOC_TYPE, primary_key = %primary_key, "delete of absent state");
            return Ok(());
        };
        let key = record_key(stub, T::DOC_TYPE, primary_key.as_str())?;
        let diff = IndexDiff::between(
            stub,
            T::DOC_TYPE,
            primary_key.as_str(),
            Some(&old),
            None,
            &self.config,
        )?;
        stub.del_state(&key)?;
        let (_, removed) = diff.apply(stub)?;
        debug!(
            tx_id = stub.tx_id(),
            doc_type = T::DOC_TYPE,
            primary_key = %primary_key,
            removed,
            "deleted state"
        );
        Ok(())
    }

    fn read_state(
        &self,
        stub: &dyn ChaincodeStub,
        primary_key: &PrimaryKey,
    ) -> Result<Option<T>, StateError> {
        primary_key.validate()?;
        let key = record_key(stub, T::DOC_TYPE, primary_key.as_str())?;
        match stub.get_state(&key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn query(
        &self,
        stub: &dyn ChaincodeStub,
        query: &str,
        is_invoke: bool,
    ) -> Result<Vec<T>, StateError> {
        let parsed = Query::parse(query)?;
        let mode = QueryMode::from(is_invoke);
        let matched = Executor::new(stub, T::DOC_TYPE, &self.config, mode).run(&parsed)?;
        debug!(
            tx_id = stub.tx_id(),
            doc_type = T::DOC_TYPE,
            ?mode,
            results = matched.len(),
            "query"
        );
        matched
            .into_values()
            .map(|doc| serde_json::from_value(doc).map_err(StateError::from))
            .collect()
    }
}

impl<T: Record> Default for IState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for IState<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for IState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IState")
            .field("doc_type", &std::any::type_name::<T>())
            .field("config", &self.config)
            .finish()
    }
}
