//! State-access error type.
//!
//! `StateError` is returned by every `StateInterface` operation. Each
//! variant maps onto the shared `ErrorCode` table via [`StateError::code`]
//! so chaincode can hand a stable numeric status back to clients.

use worldstate_primitives::ErrorCode;
use worldstate_stub::StubError;

use crate::query::QueryError;

/// Errors raised by the state-access layer.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The ledger stub rejected an operation.
    #[error(transparent)]
    Stub(#[from] StubError),

    /// A record failed to serialize or a stored value failed to parse.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The target record does not exist.
    #[error("no {doc_type} state with primary key {key:?}")]
    NotFound { doc_type: &'static str, key: String },

    /// A primary key is empty or contains a reserved character.
    #[error("invalid primary key {key:?}: {reason}")]
    InvalidPrimaryKey { key: String, reason: &'static str },

    /// A partial update tried to change the record's primary key.
    #[error("primary key cannot change from {from:?} to {to:?}")]
    PrimaryKeyChanged { from: String, to: String },

    /// Records must serialize to a JSON object.
    #[error("{doc_type} record does not serialize to a JSON object")]
    NotAnObject { doc_type: &'static str },

    /// An object key contains `.`, so its dotted path would be ambiguous.
    #[error("{doc_type} record has field name {field:?} containing '.'")]
    DottedFieldName { doc_type: &'static str, field: String },

    /// A partial-update field path could not be applied.
    #[error("invalid partial update of field {field:?}: {reason}")]
    InvalidPartialUpdate { field: String, reason: &'static str },

    /// The query string is malformed.
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    /// The query matched more records than the configured limit.
    #[error("query matched more than {limit} records")]
    TooManyResults { limit: usize },

    /// The configuration failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// An index entry does not have the expected layout.
    #[error("corrupt index entry {0:?}")]
    CorruptIndex(String),
}

impl StateError {
    /// The `ErrorCode` this error maps to.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Stub(err) => err.code(),
            Self::Codec(_) | Self::NotAnObject { .. } => ErrorCode::Encoding,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::InvalidPrimaryKey { .. } => ErrorCode::InvalidKey,
            Self::PrimaryKeyChanged { .. } => ErrorCode::KeyMismatch,
            Self::InvalidPartialUpdate { .. } | Self::DottedFieldName { .. } => {
                ErrorCode::Encoding
            }
            Self::InvalidQuery(_) => ErrorCode::InvalidQuery,
            Self::TooManyResults { .. } => ErrorCode::ResultLimit,
            Self::InvalidConfig(_) | Self::CorruptIndex(_) => ErrorCode::Internal,
        }
    }

    /// Returns true if this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_error_code_passes_through() {
        let err: StateError = StubError::write_limit().into();
        assert_eq!(err.code(), ErrorCode::WriteLimit);
        assert!(err.to_string().contains("ERR_WRITE_LIMIT"));
    }

    #[test]
    fn test_not_found() {
        let err = StateError::NotFound {
            doc_type: "car",
            key: "CAR9".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.to_string(), "no car state with primary key \"CAR9\"");
    }

    #[test]
    fn test_codec_error_maps_to_encoding() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: StateError = json_err.into();
        assert_eq!(err.code(), ErrorCode::Encoding);
    }

    #[test]
    fn test_dotted_field_name_maps_to_encoding() {
        let err = StateError::DottedFieldName {
            doc_type: "car",
            field: "a.b".into(),
        };
        assert_eq!(err.code(), ErrorCode::Encoding);
        assert_eq!(err.to_string(), "car record has field name \"a.b\" containing '.'");
    }

    #[test]
    fn test_query_error_maps_to_invalid_query() {
        let err: StateError = QueryError::Empty.into();
        assert_eq!(err.code(), ErrorCode::InvalidQuery);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_limit_and_key_codes() {
        assert_eq!(
            StateError::TooManyResults { limit: 5 }.code(),
            ErrorCode::ResultLimit
        );
        assert_eq!(
            StateError::PrimaryKeyChanged {
                from: "a".into(),
                to: "b".into()
            }
            .code(),
            ErrorCode::KeyMismatch
        );
        assert_eq!(
            StateError::InvalidPrimaryKey {
                key: String::new(),
                reason: "empty"
            }
            .code(),
            ErrorCode::InvalidKey
        );
    }
}
