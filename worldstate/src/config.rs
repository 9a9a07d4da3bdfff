//! State-access configuration.
//!
//! `IStateConfig` controls which fields are indexed and bounds query work.
//! It deserializes from JSON so chaincode can ship it alongside its
//! definition; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use worldstate_primitives::{codec, MAX_PAGE_SIZE};

use crate::error::StateError;

/// Longest field path that gets index entries.
pub const MAX_INDEXED_PATH_LEN: usize = 128;

/// Configuration for an `IState` instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IStateConfig {
    /// Dotted field paths to index. `None` indexes every scalar field.
    pub indexed_fields: Option<Vec<String>>,
    /// Maximum number of records a query may return.
    pub max_query_results: usize,
    /// Page size for paginated scans in evaluate (non-invoke) queries.
    pub page_size: u32,
}

impl Default for IStateConfig {
    fn default() -> Self {
        Self {
            indexed_fields: None,
            max_query_results: 10_000,
            page_size: 100,
        }
    }
}

impl IStateConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, StateError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Index only the given field paths.
    pub fn indexing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            indexed_fields: Some(fields.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Check limits and field names.
    pub fn validate(&self) -> Result<(), StateError> {
        if self.max_query_results == 0 {
            return Err(StateError::InvalidConfig(
                "max_query_results must be > 0".into(),
            ));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(StateError::InvalidConfig(format!(
                "page_size must be in 1..={}",
                MAX_PAGE_SIZE
            )));
        }
        for field in self.indexed_fields.iter().flatten() {
            if field.is_empty() || field.split('.').any(str::is_empty) {
                return Err(StateError::InvalidConfig(format!(
                    "indexed field {:?} has an empty path segment",
                    field
                )));
            }
            if field.len() > MAX_INDEXED_PATH_LEN {
                return Err(StateError::InvalidConfig(format!(
                    "indexed field path longer than {} bytes",
                    MAX_INDEXED_PATH_LEN
                )));
            }
            codec::validate_component(field)
                .map_err(|err| StateError::InvalidConfig(err.to_string()))?;
        }
        Ok(())
    }

    /// Returns true if `path` gets index entries.
    ///
    /// Paths longer than [`MAX_INDEXED_PATH_LEN`] or holding a reserved
    /// character are never indexed; queries on them scan the doc type.
    pub fn is_indexed(&self, path: &str) -> bool {
        if path.len() > MAX_INDEXED_PATH_LEN || codec::validate_component(path).is_err() {
            return false;
        }
        match &self.indexed_fields {
            None => true,
            Some(fields) => fields.iter().any(|f| f == path),
        }
    }
}
