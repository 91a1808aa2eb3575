//! CSV reader.

use std::path::Path;

use crate::error::IngestionResult;
use crate::ingestion::record::{Cell, Sheet, Table};

/// Read a CSV file into a single-sheet [`Table`].
///
/// Rules:
///
/// - No header handling happens here; row 0 is kept and skipped later when `includeHeaders` is set.
/// - Rows may have different lengths.
/// - Fields stay text, verbatim; blank fields become [`Cell::Empty`].
pub fn read_csv_from_path(path: impl AsRef<Path>, separator: u8) -> IngestionResult<Table> {
    let mut rdr = builder(separator).from_path(path)?;
    read_csv_from_reader(&mut rdr)
}

/// Read CSV bytes (an uploaded file's content) into a single-sheet [`Table`].
pub fn read_csv_from_bytes(bytes: &[u8], separator: u8) -> IngestionResult<Table> {
    let mut rdr = builder(separator).from_reader(bytes);
    read_csv_from_reader(&mut rdr)
}

/// Read CSV data from an existing CSV reader.
pub fn read_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<Table> {
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(Cell::from_field).collect());
    }
    Ok(Table::new(vec![Sheet::new("csv", rows)]))
}

fn builder(separator: u8) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::None)
        .delimiter(separator);
    builder
}
