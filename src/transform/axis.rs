//! Axis chart transformer (bar chart, line chart).

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::error::IngestionResult;
use crate::ingestion::record::Cell;
use crate::mapping::{ColumnMapping, ResolvedRow, fields};
use crate::types::AxisChartData;

use super::tree;

/// Read the cells at the comma-separated 0-based `offsets` of `row` as numbers.
///
/// Returns `None` when an offset is not a number or a selected cell is not numeric (including
/// offsets past the end of the row). Numeric *text* does not count as numeric.
pub fn compute_axis_values(row: &[Cell], offsets: &str) -> Option<Vec<f64>> {
    let offsets = offsets
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().ok())
        .collect::<Option<Vec<_>>>()?;
    values_at(row, &offsets, Cell::as_number)
}

fn values_at(row: &[Cell], offsets: &[usize], read: fn(&Cell) -> Option<f64>) -> Option<Vec<f64>> {
    offsets.iter().map(|&i| row.get(i).and_then(read)).collect()
}

/// Build series from mapped rows.
///
/// Each `data` column is one series, named after its header cell (or its 1-based column number
/// when there is no header row). Each row contributes one x-axis header from the `headers` column
/// and one value per series. Numeric text counts, as CSV fields are untyped text. Rows with a
/// non-numeric data cell contribute their header but no values.
pub fn from_rows(
    mapping: &ColumnMapping,
    header_row: Option<&[Cell]>,
    rows: &[ResolvedRow],
) -> AxisChartData {
    let offsets = mapping
        .get(fields::DATA)
        .map(|s| s.offsets().to_vec())
        .unwrap_or_default();

    let series_names: Vec<String> = offsets
        .iter()
        .map(|&i| {
            header_row
                .and_then(|h| h.get(i))
                .filter(|c| !c.is_empty())
                .map(Cell::to_text)
                .unwrap_or_else(|| (i + 1).to_string())
        })
        .collect();

    let mut values: IndexMap<String, Vec<f64>> = series_names
        .iter()
        .map(|name| (name.clone(), Vec::new()))
        .collect();
    let mut headers = Vec::with_capacity(rows.len());

    for (n, row) in rows.iter().enumerate() {
        headers.push(row.text_or_default(fields::HEADERS));
        match values_at(row.raw(), &offsets, Cell::to_number) {
            Some(row_values) => {
                for (name, v) in series_names.iter().zip(row_values) {
                    if let Some(series) = values.get_mut(name) {
                        series.push(v);
                    }
                }
            }
            None => warn!(row = n + 1, "skipping axis row with a non-numeric data cell"),
        }
    }

    AxisChartData { headers, values }
}

/// Build series from a forced-array `data` element: `<headers>` repeated, and one `<values>` block
/// whose child elements are the series.
///
/// Series with a non-numeric value are omitted.
pub fn from_tree(data: &Value) -> IngestionResult<AxisChartData> {
    let headers = tree::field_texts(data, "headers");
    let mut values = IndexMap::new();
    if let Some(Value::Object(block)) = tree::first(data, "values") {
        for (name, items) in block {
            let items = match items {
                Value::Array(v) => v.as_slice(),
                other => std::slice::from_ref(other),
            };
            let series = items
                .iter()
                .map(|v| tree::value_text(v).and_then(|t| t.parse::<f64>().ok()))
                .collect::<Option<Vec<_>>>();
            match series {
                Some(series) => {
                    values.insert(name.clone(), series);
                }
                None => warn!(series = %name, "omitting axis series with a non-numeric value"),
            }
        }
    }
    Ok(AxisChartData { headers, values })
}
