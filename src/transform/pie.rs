//! Pie chart and funnel transformer.

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::IngestionResult;
use crate::mapping::{ResolvedRow, fields};
use crate::types::PieChartData;

use super::tree;

/// `names` -> `values`, one slice per row. A repeated name keeps its first position and takes the
/// later value. Rows without a name or a numeric value are skipped.
pub fn from_rows(rows: &[ResolvedRow]) -> PieChartData {
    let mut values = IndexMap::new();
    for row in rows {
        if let (Some(name), Some(value)) = (row.text(fields::NAMES), row.number(fields::VALUES)) {
            values.insert(name, value);
        }
    }
    PieChartData { values }
}

/// Read the single `<values>` block, one child element per slice.
pub fn from_tree(data: &Value) -> IngestionResult<PieChartData> {
    let mut values = IndexMap::new();
    if let Some(Value::Object(block)) = tree::first(data, "values") {
        for (name, slot) in block {
            if let Some(v) = tree::slot_number(name, slot)? {
                values.insert(name.clone(), v);
            }
        }
    }
    Ok(PieChartData { values })
}
