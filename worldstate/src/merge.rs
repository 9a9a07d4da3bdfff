//! Partial-update merge.
//!
//! A partial update maps field paths to new values. A dotted path such as
//! `owner.name` sets a nested field, creating missing intermediate objects.
//! Values replace the old value wholesale; objects are not deep-merged.

use serde_json::{Map, Value};

use crate::error::StateError;

/// Apply `fields` to `doc` in place.
pub fn apply_partial(doc: &mut Map<String, Value>, fields: &Map<String, Value>) -> Result<(), StateError> {
    for (path, value) in fields {
        set_path(doc, path, value.clone())?;
    }
    Ok(())
}

fn set_path(doc: &mut Map<String, Value>, path: &str, value: Value) -> Result<(), StateError> {
    let invalid = |reason| StateError::InvalidPartialUpdate {
        field: path.to_string(),
        reason,
    };

    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(invalid("empty path segment"));
    }
    let Some((last, parents)) = segments.split_last() else {
        return Err(invalid("empty path segment"));
    };

    let mut current = doc;
    for segment in parents {
        let child = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match child {
            Value::Object(map) => map,
            _ => return Err(invalid("parent field is not an object")),
        };
    }
    current.insert(last.to_string(), value);
    Ok(())
}
