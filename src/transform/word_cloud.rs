//! Word cloud transformer.

use serde_json::Value;

use crate::error::IngestionResult;
use crate::mapping::{ResolvedRow, fields};
use crate::types::{Word, WordCloudData};

use super::tree;

/// One word per row with a non-blank `names` cell. Unmapped properties read as `""`.
pub fn from_rows(rows: &[ResolvedRow]) -> WordCloudData {
    let words = rows
        .iter()
        .filter_map(|row| {
            Some(Word {
                name: row.text(fields::NAMES)?,
                value: row.number(fields::VALUES).unwrap_or(0.0),
                properties: Some(Value::String(row.text_or_default(fields::PROPERTIES))),
            })
        })
        .collect();
    WordCloudData { words }
}

pub fn from_tree(data: &Value) -> IngestionResult<WordCloudData> {
    let mut words = Vec::new();
    for item in tree::all(data, "words") {
        words.push(Word {
            name: tree::field_text(item, "name").unwrap_or_default(),
            value: tree::field_number(item, "value")?.unwrap_or(0.0),
            properties: tree::field_properties(item, "properties"),
        });
    }
    Ok(WordCloudData { words })
}
