//! Query planning and execution over the secondary index.
//!
//! Each clause picks one access path:
//!
//! - **Exact**: an indexed `eq` condition becomes a partial-key scan on
//!   `[doc_type, field, encoded_value]`.
//! - **FieldScan**: an indexed range, `neq` or `cnt` condition scans every
//!   entry of the field and tests the decoded value. Digest entries cannot
//!   be decoded and always pass on to the record check.
//! - **DocScan**: with no usable index, every record of the doc type is read.
//!
//! Candidates are always re-checked against the full clause, so a stale
//! index entry can cost a read but never produces a wrong result. Results
//! of all clauses are merged, deduplicated and ordered by primary key.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde_json::Value;
use tracing::{debug, warn};
use worldstate_primitives::{KeyValue, INDEX_NAMESPACE};
use worldstate_stub::ChaincodeStub;

use super::parser::{Clause, Condition, Op, Query};
use crate::config::IStateConfig;
use crate::error::StateError;
use crate::index::parse_entry;
use crate::record::record_key;
use crate::value::{is_digest, Scalar};

/// How a query reads the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Unpaginated scans. Results enter the transaction's read set and see
    /// its pending writes.
    Invoke,
    /// Paginated scans, allowed only in read-only transactions.
    Evaluate,
}

impl From<bool> for QueryMode {
    fn from(is_invoke: bool) -> Self {
        if is_invoke {
            Self::Invoke
        } else {
            Self::Evaluate
        }
    }
}

/// Access path chosen for one clause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Access<'q> {
    Exact(&'q Condition),
    FieldScan(&'q Condition),
    DocScan,
}

impl<'q> Access<'q> {
    /// Pick the most selective indexed condition of `clause`.
    pub fn choose(clause: &'q Clause, config: &IStateConfig) -> Self {
        let indexed = move || {
            clause
                .conditions
                .iter()
                .filter(move |c| config.is_indexed(&c.field))
        };
        if let Some(c) = indexed().find(|c| c.op == Op::Eq) {
            return Self::Exact(c);
        }
        if let Some(c) = indexed().find(|c| c.op.is_range()) {
            return Self::FieldScan(c);
        }
        match indexed().next() {
            Some(c) => Self::FieldScan(c),
            None => Self::DocScan,
        }
    }
}

/// Runs one query against one doc type.
pub struct Executor<'a> {
    stub: &'a dyn ChaincodeStub,
    doc_type: &'a str,
    config: &'a IStateConfig,
    mode: QueryMode,
    docs: HashMap<String, Option<Value>>,
}

impl<'a> Executor<'a> {
    pub fn new(
        stub: &'a dyn ChaincodeStub,
        doc_type: &'a str,
        config: &'a IStateConfig,
        mode: QueryMode,
    ) -> Self {
        Self {
            stub,
            doc_type,
            config,
            mode,
            docs: HashMap::new(),
        }
    }

    /// Matching documents keyed and ordered by primary key.
    pub fn run(mut self, query: &Query) -> Result<BTreeMap<String, Value>, StateError> {
        let mut matched = BTreeMap::new();
        for clause in &query.clauses {
            let access = Access::choose(clause, self.config);
            debug!(doc_type = self.doc_type, ?access, mode = ?self.mode, "query clause");
            match access {
                Access::DocScan => self.doc_scan(clause, &mut matched)?,
                Access::Exact(cond) => {
                    let encoded = cond.operand.as_scalar().encode();
                    let entries = self.scan(
                        INDEX_NAMESPACE,
                        &[self.doc_type, cond.field.as_str(), encoded.as_str()],
                    )?;
                    let candidates = self.candidates(&entries, |_| true)?;
                    self.check(clause, candidates, &mut matched)?;
                }
                Access::FieldScan(cond) => {
                    let entries =
                        self.scan(INDEX_NAMESPACE, &[self.doc_type, cond.field.as_str()])?;
                    let candidates = self.candidates(&entries, |s| cond.matches_scalar(s))?;
                    self.check(clause, candidates, &mut matched)?;
                }
            }
        }
        Ok(matched)
    }

    fn scan(&self, object_type: &str, attributes: &[&str]) -> Result<Vec<KeyValue>, StateError> {
        match self.mode {
            QueryMode::Invoke => Ok(self
                .stub
                .get_state_by_partial_composite_key(object_type, attributes)?),
            QueryMode::Evaluate => {
                let mut out = Vec::new();
                let mut bookmark = String::new();
                loop {
                    let (page, meta) = self
                        .stub
                        .get_state_by_partial_composite_key_with_pagination(
                            object_type,
                            attributes,
                            self.config.page_size,
                            &bookmark,
                        )?;
                    out.extend(page);
                    if meta.is_exhausted() {
                        break;
                    }
                    bookmark = meta.bookmark;
                }
                Ok(out)
            }
        }
    }

    /// Primary keys of index entries whose value passes `keep`.
    fn candidates(
        &self,
        entries: &[KeyValue],
        keep: impl Fn(&Scalar<'_>) -> bool,
    ) -> Result<BTreeSet<String>, StateError> {
        let mut out = BTreeSet::new();
        for kv in entries {
            let entry = parse_entry(self.stub, &kv.key)?;
            let pass = if is_digest(&entry.encoded) {
                true
            } else {
                let scalar = Scalar::decode(&entry.encoded)
                    .ok_or_else(|| StateError::CorruptIndex(entry.key.clone()))?;
                keep(&scalar)
            };
            if pass {
                out.insert(entry.primary_key);
            }
        }
        Ok(out)
    }

    fn check(
        &mut self,
        clause: &Clause,
        candidates: BTreeSet<String>,
        matched: &mut BTreeMap<String, Value>,
    ) -> Result<(), StateError> {
        let doc_type = self.doc_type;
        for pk in candidates {
            if matched.contains_key(&pk) {
                continue;
            }
            match self.load(&pk)? {
                Some(doc) if clause.matches(doc) => {
                    matched.insert(pk, doc.clone());
                }
                Some(_) => {}
                None => {
                    warn!(doc_type, primary_key = %pk, "index entry without record");
                }
            }
            self.check_limit(matched)?;
        }
        Ok(())
    }

    fn doc_scan(
        &mut self,
        clause: &Clause,
        matched: &mut BTreeMap<String, Value>,
    ) -> Result<(), StateError> {
        for kv in self.scan(self.doc_type, &[])? {
            let (_, attrs) = self.stub.split_composite_key(&kv.key)?;
            let [pk] = attrs.as_slice() else {
                continue;
            };
            if matched.contains_key(pk) {
                continue;
            }
            let doc: Value = serde_json::from_slice(&kv.value)?;
            if clause.matches(&doc) {
                matched.insert(pk.clone(), doc.clone());
                self.check_limit(matched)?;
            }
            self.docs.insert(pk.clone(), Some(doc));
        }
        Ok(())
    }

    fn load(&mut self, pk: &str) -> Result<Option<&Value>, StateError> {
        if !self.docs.contains_key(pk) {
            let key = record_key(self.stub, self.doc_type, pk)?;
            let doc = match self.stub.get_state(&key)? {
                Some(bytes) => Some(serde_json::from_slice::<Value>(&bytes)?),
                None => None,
            };
            self.docs.insert(pk.to_string(), doc);
        }
        Ok(self.docs.get(pk).and_then(Option::as_ref))
    }

    fn check_limit(&self, matched: &BTreeMap<String, Value>) -> Result<(), StateError> {
        let limit = self.config.max_query_results;
        if matched.len() > limit {
            return Err(StateError::TooManyResults { limit });
        }
        Ok(())
    }
}
