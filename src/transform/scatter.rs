//! Scatter transformer.

use serde_json::Value;

use crate::error::IngestionResult;
use crate::ingestion::record::Cell;
use crate::mapping::{ResolvedRow, fields};
use crate::types::{ScatterData, ScatterPoint};

use super::tree;

/// Read the cells at the comma-separated 0-based `offsets` of `row` as coordinates.
///
/// Offsets past the end of the row, blank cells and non-numeric cells read as `0`. Numeric text is
/// parsed. Unparseable offsets are ignored.
pub fn compute_scatter_values(row: &[Cell], offsets: &str) -> Vec<f64> {
    offsets
        .split(',')
        .filter_map(|s| s.trim().parse::<usize>().ok())
        .map(|i| coordinate(row.get(i)))
        .collect()
}

fn coordinate(cell: Option<&Cell>) -> f64 {
    cell.and_then(Cell::to_number).unwrap_or(0.0)
}

/// One point per row: the `values` cells are the coordinates, `categories` names the series.
/// Unmapped properties read as `""`.
pub fn from_rows(rows: &[ResolvedRow]) -> ScatterData {
    let points = rows
        .iter()
        .filter_map(|row| {
            let cells = row.get(fields::VALUES)?.cells();
            Some(ScatterPoint {
                value: cells.iter().map(|c| coordinate(Some(c))).collect(),
                category: row.text_or_default(fields::CATEGORIES),
                properties: Some(Value::String(row.text_or_default(fields::PROPERTIES))),
            })
        })
        .collect();
    ScatterData { points }
}

pub fn from_tree(data: &Value) -> IngestionResult<ScatterData> {
    let mut points = Vec::new();
    for item in tree::all(data, "points") {
        let value = tree::all(item, "value")
            .iter()
            .map(|v| match tree::value_text(v) {
                Some(raw) => tree::parse_number("value", &raw).map(Option::unwrap_or_default),
                None => Ok(0.0),
            })
            .collect::<IngestionResult<Vec<_>>>()?;
        points.push(ScatterPoint {
            value,
            category: tree::field_text(item, "category").unwrap_or_default(),
            properties: tree::field_properties(item, "properties"),
        });
    }
    Ok(ScatterData { points })
}
