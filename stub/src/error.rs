//! Stub-side error type.
//!
//! `StubError` is returned by every `ChaincodeStub` and `StateStore`
//! method. It wraps an `ErrorCode` for ledger-defined failures and
//! provides an `Internal` variant for backend failures that carry a
//! message.

use std::fmt;

use worldstate_primitives::{CodecError, ErrorCode};

/// Error type returned by stub and store methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubError {
    /// A ledger-defined error code.
    Code(ErrorCode),
    /// A composite-key component was malformed.
    Codec(CodecError),
    /// A backend failure not covered by a code. Maps to `ERR_INTERNAL`.
    Internal(String),
}

impl StubError {
    /// Convert to the numeric error code.
    pub fn to_error_code(&self) -> i32 {
        self.code().as_i32()
    }

    /// The `ErrorCode` this error maps to.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Code(code) => *code,
            Self::Codec(err) => err.code(),
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    pub fn invalid_key() -> Self {
        Self::Code(ErrorCode::InvalidKey)
    }

    pub fn key_too_large() -> Self {
        Self::Code(ErrorCode::KeyTooLarge)
    }

    pub fn value_too_large() -> Self {
        Self::Code(ErrorCode::ValueTooLarge)
    }

    pub fn write_limit() -> Self {
        Self::Code(ErrorCode::WriteLimit)
    }

    pub fn page_limit() -> Self {
        Self::Code(ErrorCode::PageLimit)
    }

    /// A write after a paginated scan, or a paginated scan after a write.
    pub fn read_only_violation() -> Self {
        Self::Code(ErrorCode::ReadOnlyViolation)
    }
}

impl fmt::Display for StubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "stub error: {}", code),
            Self::Codec(err) => write!(f, "stub error: {}", err),
            Self::Internal(msg) => write!(f, "internal stub error: {}", msg),
        }
    }
}

impl std::error::Error for StubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ErrorCode> for StubError {
    fn from(code: ErrorCode) -> Self {
        Self::Code(code)
    }
}

impl From<CodecError> for StubError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err)
    }
}
