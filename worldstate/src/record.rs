//! Application record types and primary keys.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use worldstate_primitives::codec;
use worldstate_stub::ChaincodeStub;

use crate::error::StateError;

/// A chaincode record stored in world state.
///
/// Records are stored as JSON under the composite key
/// `(DOC_TYPE, [primary_key])`. The serialized form must be a JSON object.
pub trait Record: Serialize + DeserializeOwned {
    /// Object type under which records of this kind are stored and indexed.
    const DOC_TYPE: &'static str;

    /// The record's primary key.
    fn primary_key(&self) -> PrimaryKey;
}

/// Longest primary key accepted. Leaves room in index entry keys for the
/// field path and encoded value.
pub const MAX_PRIMARY_KEY_LEN: usize = 512;

/// Primary key of a record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrimaryKey(String);

impl PrimaryKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Reject keys that cannot be a composite-key attribute.
    pub fn validate(&self) -> Result<(), StateError> {
        if self.0.is_empty() {
            return Err(StateError::InvalidPrimaryKey {
                key: self.0.clone(),
                reason: "primary key is empty",
            });
        }
        if self.0.len() > MAX_PRIMARY_KEY_LEN {
            return Err(StateError::InvalidPrimaryKey {
                key: self.0.clone(),
                reason: "primary key is too long",
            });
        }
        codec::validate_component(&self.0).map_err(|_| StateError::InvalidPrimaryKey {
            key: self.0.clone(),
            reason: "primary key contains a reserved character",
        })
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PrimaryKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PrimaryKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for PrimaryKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&String> for PrimaryKey {
    fn from(key: &String) -> Self {
        Self(key.clone())
    }
}

macro_rules! primary_key_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for PrimaryKey {
                fn from(key: $t) -> Self {
                    Self(key.to_string())
                }
            }
        )*
    };
}

primary_key_from_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// Ledger key of the record `primary_key` of `doc_type`.
pub(crate) fn record_key(
    stub: &dyn ChaincodeStub,
    doc_type: &str,
    primary_key: &str,
) -> Result<String, StateError> {
    Ok(stub.create_composite_key(doc_type, &[primary_key])?)
}
