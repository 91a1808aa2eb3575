//! Intermediate records produced by the format readers.
//!
//! CSV and Excel files become a [`Table`] of loosely typed [`Cell`]s; JSON and XML files become a
//! `serde_json::Value` document tree.

/// A single spreadsheet/CSV cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing/empty cell. Reads as the empty string.
    Empty,
    /// Text cell.
    Text(String),
    /// Numeric cell (Excel numbers and dates).
    Number(f64),
    /// Boolean cell.
    Bool(bool),
}

impl Cell {
    /// Cell of a delimited-text field. CSV carries no types, so the field is kept verbatim as text
    /// and only read as a number where a transformer asks for one.
    pub fn from_field(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(raw.to_string())
        }
    }

    /// `true` for [`Cell::Empty`] and blank text.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text rendering of the cell. Empty cells read as `""`; integral numbers drop the fraction.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => format_number(*n),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// The cell's value if it is a number cell. Text is *not* coerced.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Lenient numeric reading: numbers, numeric text and booleans (as 1/0).
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Empty => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

/// One sheet of cells, row-major. CSV files produce exactly one sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// The selected sheets of a tabular file, in selection order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub sheets: Vec<Sheet>,
}

impl Table {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Data rows of every sheet, concatenated. With `skip_header` the first row of *each* sheet is
    /// dropped.
    pub fn data_rows(&self, skip_header: bool) -> impl Iterator<Item = &[Cell]> + '_ {
        self.sheets.iter().flat_map(move |sheet| {
            sheet
                .rows
                .iter()
                .skip(usize::from(skip_header))
                .map(Vec::as_slice)
        })
    }

    /// Header row of the first sheet, if any.
    pub fn header_row(&self) -> Option<&[Cell]> {
        self.sheets
            .first()
            .and_then(|s| s.rows.first())
            .map(Vec::as_slice)
    }

    /// Total number of rows across sheets (header rows included).
    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }
}

/// Intermediate record produced by a reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// CSV/Excel cell grid.
    Table(Table),
    /// JSON document, or XML document converted with the forced-array convention.
    Document(serde_json::Value),
}
