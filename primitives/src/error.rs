//! Error codes shared across the world-state crates.
//!
//! Every layer maps its errors onto one of these codes so chaincode can
//! return a stable numeric status to clients.

use core::fmt;

/// Stable world-state error codes.
///
/// `0` = OK, non-zero = error. These repr values are part of the public
/// contract and must not be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    InvalidKey = 1,
    KeyTooLarge = 2,
    ValueTooLarge = 3,
    WriteLimit = 4,
    PageLimit = 5,
    ReadOnlyViolation = 6,
    Encoding = 7,
    NotFound = 8,
    InvalidQuery = 9,
    ResultLimit = 10,
    KeyMismatch = 11,
    Internal = 12,
}

impl ErrorCode {
    /// Convert from an i32 code.
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::InvalidKey),
            2 => Some(Self::KeyTooLarge),
            3 => Some(Self::ValueTooLarge),
            4 => Some(Self::WriteLimit),
            5 => Some(Self::PageLimit),
            6 => Some(Self::ReadOnlyViolation),
            7 => Some(Self::Encoding),
            8 => Some(Self::NotFound),
            9 => Some(Self::InvalidQuery),
            10 => Some(Self::ResultLimit),
            11 => Some(Self::KeyMismatch),
            12 => Some(Self::Internal),
            _ => None,
        }
    }

    /// Return the i32 representation of this error code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns true if this is the `Ok` variant.
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::InvalidKey => write!(f, "ERR_INVALID_KEY"),
            Self::KeyTooLarge => write!(f, "ERR_KEY_TOO_LARGE"),
            Self::ValueTooLarge => write!(f, "ERR_VALUE_TOO_LARGE"),
            Self::WriteLimit => write!(f, "ERR_WRITE_LIMIT"),
            Self::PageLimit => write!(f, "ERR_PAGE_LIMIT"),
            Self::ReadOnlyViolation => write!(f, "ERR_READ_ONLY_VIOLATION"),
            Self::Encoding => write!(f, "ERR_ENCODING"),
            Self::NotFound => write!(f, "ERR_NOT_FOUND"),
            Self::InvalidQuery => write!(f, "ERR_INVALID_QUERY"),
            Self::ResultLimit => write!(f, "ERR_RESULT_LIMIT"),
            Self::KeyMismatch => write!(f, "ERR_KEY_MISMATCH"),
            Self::Internal => write!(f, "ERR_INTERNAL"),
        }
    }
}
