#![cfg(feature = "excel")]

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto, open_workbook_auto_from_rs};

use crate::error::{IngestionError, IngestionResult};
use crate::ingestion::record::{Cell, Sheet, Table};

/// Read the selected sheets of an Excel document (`.xlsx`, `.xls`, `.ods`, etc.) into a [`Table`].
///
/// Behavior:
/// - `sheets` holds 0-based sheet positions, read in the order given
/// - Every row is kept, header rows included; empty cells become [`Cell::Empty`]
/// - Cell positions are counted from A1, even when the first rows or columns are empty
/// - Date cells become their serial number; calendar transformers normalise them
pub fn read_excel_from_path(path: impl AsRef<Path>, sheets: &[usize]) -> IngestionResult<Table> {
    let mut workbook = open_workbook_auto(path)?;
    read_workbook(&mut workbook, sheets)
}

/// Read an uploaded workbook from memory. The format is sniffed from the content.
pub fn read_excel_from_bytes(bytes: &[u8], sheets: &[usize]) -> IngestionResult<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    read_workbook(&mut workbook, sheets)
}

fn read_workbook<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    sheets: &[usize],
) -> IngestionResult<Table> {
    let names = workbook.sheet_names().to_vec();
    if names.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "workbook has no sheets".to_string(),
        });
    }

    let mut out = Vec::with_capacity(sheets.len());
    for &idx in sheets {
        let name = names.get(idx).ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!(
                "sheet {} does not exist; workbook has {} sheet(s)",
                idx + 1,
                names.len()
            ),
        })?;
        let range = workbook.worksheet_range(name)?;
        out.push(Sheet::new(name.clone(), anchored_rows(&range)));
    }

    Ok(Table::new(out))
}

/// Rows of `range` positioned from A1, so that 1-based selectors address sheet columns.
///
/// calamine ranges start at the first used cell; leading empty rows and columns are restored as
/// empty cells.
fn anchored_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let Some((first_row, first_col)) = range.start() else {
        return Vec::new();
    };
    let pad = first_col as usize;
    let mut rows: Vec<Vec<Cell>> = (0..first_row).map(|_| Vec::new()).collect();
    rows.extend(range.rows().map(|row| {
        let mut cells = vec![Cell::Empty; pad];
        cells.extend(row.iter().map(convert_cell));
        cells
    }));
    rows
}

fn convert_cell(c: &Data) -> Cell {
    match c {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("{e:?}")),
    }
}
