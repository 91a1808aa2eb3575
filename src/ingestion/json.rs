//! JSON reader.
//!
//! Supported inputs:
//! - A single document object: `{"name": "...", "type": "sankey", "data": {...}}`
//! - A bare data object: `{"nodes": [...], "links": [...]}`
//! - An array of either: `[{...}, {...}]`
//!
//! Malformed JSON is a hard error; there is no partial recovery.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{IngestionError, IngestionResult};

/// Read a JSON file into its documents.
pub fn read_json_from_path(path: impl AsRef<Path>) -> IngestionResult<Vec<Value>> {
    let text = fs::read_to_string(path)?;
    read_json_from_str(&text)
}

/// Read JSON from an in-memory string. An array yields one document per element.
pub fn read_json_from_str(input: &str) -> IngestionResult<Vec<Value>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    match serde_json::from_str::<Value>(trimmed)? {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| match v {
                Value::Object(_) => Ok(v),
                _ => Err(IngestionError::SchemaMismatch {
                    message: format!("document {} is not a json object", i + 1),
                }),
            })
            .collect(),
        v @ Value::Object(_) => Ok(vec![v]),
        _ => Err(IngestionError::SchemaMismatch {
            message: "json must be an object or an array of objects".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_yield_one_document_per_element() {
        let docs = read_json_from_str(r#"[{"a":1},{"b":2}]"#).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = read_json_from_str(r#"{"nodes": ["#).unwrap_err();
        assert!(matches!(err, IngestionError::Json(_)));
    }

    #[test]
    fn scalars_are_rejected() {
        let err = read_json_from_str("42").unwrap_err();
        assert!(matches!(err, IngestionError::SchemaMismatch { .. }));
    }
}
