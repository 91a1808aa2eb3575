//! Column mapping: semantic field names bound to 1-based column selectors.
//!
//! A mapping such as `{"nodes": "1", "children": "7,8"}` is parsed once per file into
//! [`ColumnMapping`]; every data row is then resolved into a [`ResolvedRow`] that transformers read
//! by field name.

use indexmap::IndexMap;

use crate::error::{IngestionError, IngestionResult};
use crate::ingestion::record::Cell;

/// Well-known mapping field names.
pub mod fields {
    pub const NODES: &str = "nodes";
    pub const NAMES: &str = "names";
    pub const VALUES: &str = "values";
    pub const CATEGORIES: &str = "categories";
    pub const PROPERTIES: &str = "properties";
    pub const SOURCES: &str = "sources";
    pub const TARGETS: &str = "targets";
    pub const LABELS: &str = "labels";
    pub const CHILDREN: &str = "children";
    pub const DATES: &str = "dates";
    pub const DATA: &str = "data";
    pub const HEADERS: &str = "headers";
    pub const TIMES: &str = "times";
    pub const SUMMARIES: &str = "summaries";
    pub const TYPES: &str = "types";
    pub const AUTHORS: &str = "authors";
    pub const TAGS: &str = "tags";
    pub const DESCRIPTIONS: &str = "descriptions";
    pub const TITLES: &str = "titles";

    pub const VISUALIZATION_NAME: &str = "visualizationName";
    pub const VISUALIZATION_DESCRIPTION: &str = "visualizationDescription";
    pub const VISUALIZATION_TAGS: &str = "visualizationTags";
}

/// Parse a comma-separated list of 1-based numbers into 0-based indices.
///
/// `field` is only used in the error. Blank items are skipped; `0` and non-numeric items are
/// rejected.
pub fn parse_one_based_list(field: &str, text: &str) -> IngestionResult<Vec<usize>> {
    let invalid = |message: String| IngestionError::InvalidSelector {
        field: field.to_string(),
        selector: text.to_string(),
        message,
    };

    let mut out = Vec::new();
    for item in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let n: usize = item
            .parse()
            .map_err(|_| invalid(format!("'{item}' is not a column number")))?;
        if n == 0 {
            return Err(invalid("column numbers start at 1".to_string()));
        }
        out.push(n - 1);
    }
    if out.is_empty() {
        return Err(invalid("no column numbers given".to_string()));
    }
    Ok(out)
}

/// A parsed column selector, 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Single(usize),
    Multi(Vec<usize>),
}

impl Selector {
    /// Parse a 1-based selector string (`"3"` or `"7,8"`).
    pub fn parse(field: &str, text: &str) -> IngestionResult<Self> {
        let mut indices = parse_one_based_list(field, text)?;
        if indices.len() == 1 && !text.contains(',') {
            Ok(Self::Single(indices.remove(0)))
        } else {
            Ok(Self::Multi(indices))
        }
    }

    /// The selected 0-based offsets.
    pub fn offsets(&self) -> &[usize] {
        match self {
            Self::Single(i) => std::slice::from_ref(i),
            Self::Multi(v) => v,
        }
    }
}

/// Field name -> selector, in the caller's order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    fields: IndexMap<String, Selector>,
}

impl ColumnMapping {
    /// Parse every non-blank selector of a raw mapping. Blank selectors mean "not mapped".
    pub fn parse(raw: &IndexMap<String, String>) -> IngestionResult<Self> {
        let mut fields = IndexMap::with_capacity(raw.len());
        for (field, text) in raw {
            if text.trim().is_empty() {
                continue;
            }
            fields.insert(field.clone(), Selector::parse(field, text)?);
        }
        Ok(Self { fields })
    }

    pub fn get(&self, field: &str) -> Option<&Selector> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Read every mapped field out of `row`. Cells past the end of the row read as
    /// [`Cell::Empty`].
    pub fn resolve(&self, row: &[Cell]) -> ResolvedRow {
        let cell = |i: usize| row.get(i).cloned().unwrap_or(Cell::Empty);
        let fields = self
            .fields
            .iter()
            .map(|(name, selector)| {
                let resolved = match selector {
                    Selector::Single(i) => Resolved::One(cell(*i)),
                    Selector::Multi(v) => Resolved::Many(v.iter().map(|i| cell(*i)).collect()),
                };
                (name.clone(), resolved)
            })
            .collect();
        ResolvedRow {
            raw: row.to_vec(),
            fields,
        }
    }
}

/// Value of one mapped field in one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    One(Cell),
    Many(Vec<Cell>),
}

impl Resolved {
    /// First cell of the field.
    pub fn first(&self) -> Option<&Cell> {
        match self {
            Self::One(c) => Some(c),
            Self::Many(v) => v.first(),
        }
    }

    pub fn cells(&self) -> &[Cell] {
        match self {
            Self::One(c) => std::slice::from_ref(c),
            Self::Many(v) => v,
        }
    }
}

/// One data row with its mapped fields resolved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedRow {
    raw: Vec<Cell>,
    fields: IndexMap<String, Resolved>,
}

impl ResolvedRow {
    pub fn get(&self, field: &str) -> Option<&Resolved> {
        self.fields.get(field)
    }

    /// The full, unmapped row.
    pub fn raw(&self) -> &[Cell] {
        &self.raw
    }

    /// Text of the field's first cell, `None` when the field is unmapped or the cell is blank.
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field)
            .and_then(Resolved::first)
            .filter(|c| !c.is_empty())
            .map(Cell::to_text)
    }

    /// Text of the field's first cell, `""` when unmapped.
    pub fn text_or_default(&self, field: &str) -> String {
        self.text(field).unwrap_or_default()
    }

    /// Lenient numeric value of the field's first cell.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Resolved::first).and_then(Cell::to_number)
    }

    /// Non-blank texts of every cell of the field.
    pub fn texts(&self, field: &str) -> Vec<String> {
        self.get(field)
            .map(|r| {
                r.cells()
                    .iter()
                    .filter(|c| !c.is_empty())
                    .map(Cell::to_text)
                    .collect()
            })
            .unwrap_or_default()
    }
}
