//! Navigation helpers over forced-array document trees (XML) and plain JSON values.

use serde_json::Value;

use crate::error::{IngestionError, IngestionResult};
use crate::ingestion::xml::collapse_singletons;
use crate::types::Properties;

/// Every value stored under `key`: the array itself, or the single value as a one-item slice.
pub(crate) fn all<'a>(v: &'a Value, key: &str) -> &'a [Value] {
    match v.get(key) {
        Some(Value::Array(items)) => items,
        Some(other) => std::slice::from_ref(other),
        None => &[],
    }
}

/// The first value stored under `key`.
pub(crate) fn first<'a>(v: &'a Value, key: &str) -> Option<&'a Value> {
    all(v, key).first()
}

/// Scalar text of a value. Elements with attributes yield their `_` text.
pub(crate) fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => map.get("_").and_then(value_text),
        Value::Array(items) if items.len() == 1 => value_text(&items[0]),
        _ => None,
    }
}

/// Non-blank text of the first value under `key`.
pub(crate) fn field_text(v: &Value, key: &str) -> Option<String> {
    first(v, key).and_then(value_text).filter(|s| !s.is_empty())
}

/// Every non-blank text under `key`.
pub(crate) fn field_texts(v: &Value, key: &str) -> Vec<String> {
    all(v, key)
        .iter()
        .filter_map(value_text)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a numeric text. Blank text is `None`; anything else that is not a number is an error.
pub(crate) fn parse_number(key: &str, raw: &str) -> IngestionResult<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| IngestionError::SchemaMismatch {
            message: format!("'{key}' expects a number, got '{raw}'"),
        })
}

/// Numeric value of the first value under `key`.
pub(crate) fn field_number(v: &Value, key: &str) -> IngestionResult<Option<f64>> {
    match v.get(key) {
        Some(slot) => slot_number(key, slot),
        None => Ok(None),
    }
}

/// Numeric value of a slot: the value itself, or the first item of a forced array.
pub(crate) fn slot_number(key: &str, slot: &Value) -> IngestionResult<Option<f64>> {
    let first = match slot {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    match first.and_then(value_text) {
        Some(raw) => parse_number(key, &raw),
        None => Ok(None),
    }
}

/// Free-form properties under `key`, with singleton arrays collapsed.
pub(crate) fn field_properties(v: &Value, key: &str) -> Option<Properties> {
    first(v, key).map(collapse_singletons)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn forced_arrays_and_plain_values_read_alike() {
        let xml = json!({ "name": ["A"], "value": ["3"] });
        let plain = json!({ "name": "A", "value": 3 });
        assert_eq!(field_text(&xml, "name"), field_text(&plain, "name"));
        assert_eq!(field_number(&xml, "value").unwrap(), Some(3.0));
        assert_eq!(field_number(&plain, "value").unwrap(), Some(3.0));
        assert!(field_number(&json!({ "value": ["x"] }), "value").is_err());
        assert!(all(&plain, "missing").is_empty());
    }
}
