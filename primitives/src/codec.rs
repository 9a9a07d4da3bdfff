//! Composite-key encoding.
//!
//! Composite keys follow the ledger convention:
//!
//! ```text
//! U+0000 object_type U+0000 attr_1 U+0000 attr_2 U+0000 ... attr_n U+0000
//! ```
//!
//! The leading U+0000 keeps composite keys out of plain range scans, which
//! only accept simple keys. A partial-key scan covers
//! `[create(object_type, prefix_attrs), create(...) + U+10FFFF)`.

use crate::error::ErrorCode;

/// Delimiter and namespace marker for composite keys.
pub const COMPOSITE_KEY_DELIMITER: char = '\u{0}';

/// Highest code point; appended to a partial key to form an exclusive end bound.
pub const MAX_UNICODE_RUNE: char = '\u{10FFFF}';

/// Composite-key codec failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// An object type or attribute contains a reserved code point.
    #[error("composite key component {component:?} contains reserved character U+{code:04X}")]
    ReservedCharacter { component: String, code: u32 },

    /// The key does not start with the composite-key namespace marker.
    #[error("key {0:?} is not a composite key")]
    NotComposite(String),
}

impl CodecError {
    /// Map to the shared error code table.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::InvalidKey
    }
}

/// Reject components that contain the delimiter or the max rune.
pub fn validate_component(component: &str) -> Result<(), CodecError> {
    for ch in component.chars() {
        if ch == COMPOSITE_KEY_DELIMITER || ch == MAX_UNICODE_RUNE {
            return Err(CodecError::ReservedCharacter {
                component: component.to_string(),
                code: ch as u32,
            });
        }
    }
    Ok(())
}

/// Build a composite key from an object type and its attributes.
pub fn create_composite_key(object_type: &str, attributes: &[&str]) -> Result<String, CodecError> {
    validate_component(object_type)?;
    let capacity = 2
        + object_type.len()
        + attributes.iter().map(|a| a.len() + 1).sum::<usize>();
    let mut key = String::with_capacity(capacity);
    key.push(COMPOSITE_KEY_DELIMITER);
    key.push_str(object_type);
    key.push(COMPOSITE_KEY_DELIMITER);
    for attr in attributes {
        validate_component(attr)?;
        key.push_str(attr);
        key.push(COMPOSITE_KEY_DELIMITER);
    }
    Ok(key)
}

/// Split a composite key into its object type and attributes.
pub fn split_composite_key(key: &str) -> Result<(String, Vec<String>), CodecError> {
    let body = key
        .strip_prefix(COMPOSITE_KEY_DELIMITER)
        .ok_or_else(|| CodecError::NotComposite(key.to_string()))?;
    let mut parts = body.split(COMPOSITE_KEY_DELIMITER);
    let object_type = parts
        .next()
        .ok_or_else(|| CodecError::NotComposite(key.to_string()))?
        .to_string();
    let mut attributes: Vec<String> = parts.map(str::to_string).collect();
    // Well-formed keys end with a delimiter, which yields one trailing empty part.
    if attributes.last().is_some_and(|a| a.is_empty()) {
        attributes.pop();
    }
    Ok((object_type, attributes))
}

/// Returns true if `key` lives in the composite-key namespace.
pub fn is_composite_key(key: &str) -> bool {
    key.starts_with(COMPOSITE_KEY_DELIMITER)
}

/// Half-open range `[start, end)` covering every key that extends the
/// partial composite key.
pub fn partial_key_range(object_type: &str, attributes: &[&str]) -> Result<(String, String), CodecError> {
    let start = create_composite_key(object_type, attributes)?;
    let mut end = start.clone();
    end.push(MAX_UNICODE_RUNE);
    Ok((start, end))
}
