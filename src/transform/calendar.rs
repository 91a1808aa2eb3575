//! Calendar transformer and date normalisation.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::warn;

use crate::error::IngestionResult;
use crate::ingestion::record::Cell;
use crate::mapping::{ResolvedRow, fields};
use crate::types::{CalendarData, CalendarEntry};

use super::tree;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Normalise a date string to `YYYY-MM-DD`.
///
/// Accepts ISO dates and datetimes (with or without offset), a few common day/month layouts,
/// JavaScript `Date::toString` output and Excel serial numbers. Returns `None` when nothing
/// matches.
pub fn reformat_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(serial) = raw.parse::<f64>() {
        return excel_serial_to_date(serial);
    }
    parse_date(raw).map(|d| d.format("%Y-%m-%d").to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
    {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
    {
        return Some(dt.date());
    }
    // "Sun Oct 05 1997 00:00:00 GMT+0300 (...)"
    let head = raw.split_whitespace().take(4).collect::<Vec<_>>().join(" ");
    NaiveDate::parse_from_str(&head, "%a %b %d %Y").ok()
}

/// Convert an Excel serial day number to `YYYY-MM-DD`.
///
/// Serials below 60 predate the fictitious 1900-02-29 and count from 1899-12-31.
pub fn excel_serial_to_date(serial: f64) -> Option<String> {
    if !serial.is_finite() || !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let days = serial.floor() as i64;
    let base = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    base.checked_add_signed(Duration::days(days))
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// Date of a spreadsheet cell: numbers are Excel serials, text is parsed.
pub fn calendar_date(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Number(n) => excel_serial_to_date(*n),
        Cell::Text(s) => reformat_date(s),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// Build calendar entries from mapped rows (`dates`, `values`, `categories`, `properties`).
///
/// Rows whose date cannot be parsed are skipped. Unmapped properties read as `""`.
pub fn from_rows(rows: &[ResolvedRow]) -> CalendarData {
    let mut calendar = Vec::with_capacity(rows.len());
    for row in rows {
        let cell = row
            .get(fields::DATES)
            .and_then(|r| r.first())
            .cloned()
            .unwrap_or(Cell::Empty);
        let Some(date) = calendar_date(&cell) else {
            warn!(date = %cell.to_text(), "skipping calendar row with unparseable date");
            continue;
        };
        calendar.push(CalendarEntry {
            date,
            value: row.number(fields::VALUES).unwrap_or(1.0),
            category: row.text_or_default(fields::CATEGORIES),
            properties: Some(Value::String(row.text_or_default(fields::PROPERTIES))),
        });
    }
    CalendarData { calendar }
}

/// Normalise parseable dates in place. Unparseable dates are left for validation to report.
pub fn normalize(data: &mut CalendarData) {
    for entry in &mut data.calendar {
        if let Some(date) = reformat_date(&entry.date) {
            entry.date = date;
        }
    }
}

/// Build calendar entries from a forced-array `data` element.
pub fn from_tree(data: &Value) -> IngestionResult<CalendarData> {
    let mut calendar = Vec::new();
    for item in tree::all(data, "calendar") {
        let raw = tree::field_text(item, "date").unwrap_or_default();
        calendar.push(CalendarEntry {
            date: reformat_date(&raw).unwrap_or(raw),
            value: tree::field_number(item, "value")?.unwrap_or(1.0),
            category: tree::field_text(item, "category").unwrap_or_default(),
            properties: tree::field_properties(item, "properties"),
        });
    }
    Ok(CalendarData { calendar })
}
