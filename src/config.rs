//! Per-call ingestion configuration: which files were uploaded and how to read them.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, IngestionResult};
use crate::mapping::parse_one_based_list;

/// Source file format declared by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "EXCEL")]
    Excel,
    #[serde(rename = "CSV")]
    Csv,
    #[serde(rename = "JSON")]
    Json,
    #[serde(rename = "XML")]
    Xml,
    /// Any other declared type; rejected with "Invalid file type provided".
    #[serde(other)]
    Unsupported,
}

impl FileType {
    /// Parse the wire name (`EXCEL`, `CSV`, `JSON`, `XML`, case-insensitive).
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "EXCEL" => Self::Excel,
            "CSV" => Self::Csv,
            "JSON" => Self::Json,
            "XML" => Self::Xml,
            _ => Self::Unsupported,
        }
    }

    /// CSV and Excel are read as cell grids and need a column mapping.
    pub fn is_tabular(self) -> bool {
        matches!(self, Self::Excel | Self::Csv)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excel => "EXCEL",
            Self::Csv => "CSV",
            Self::Json => "JSON",
            Self::Xml => "XML",
            Self::Unsupported => "UNSUPPORTED",
        }
    }
}

/// An uploaded file as handed over by the upload layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileProperties {
    pub file_path: PathBuf,
    /// MIME type reported by the upload layer. Informational only; [`FileDetails::file_type`] decides
    /// how the file is read.
    #[serde(rename = "type", default)]
    pub mime_type: String,
}

impl FileProperties {
    pub fn new(file_path: impl AsRef<Path>, mime_type: impl Into<String>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
            mime_type: mime_type.into(),
        }
    }
}

/// How the uploaded files should be read.
///
/// `mapping` binds semantic field names (`nodes`, `values`, `children`, ...) to 1-based column
/// selectors such as `"3"` or `"7,8"`. It is required for CSV and Excel and ignored for JSON and XML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_headers: Option<bool>,
    /// 1-based sheet numbers, comma separated (Excel only). Defaults to the first sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheets: Option<String>,
    /// Single-character field separator (CSV only). Defaults to `,`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<IndexMap<String, String>>,
}

impl FileDetails {
    pub fn new(file_type: FileType) -> Self {
        Self {
            file_type: Some(file_type),
            ..Default::default()
        }
    }

    pub fn with_headers(mut self, include_headers: bool) -> Self {
        self.include_headers = Some(include_headers);
        self
    }

    pub fn with_sheets(mut self, sheets: impl Into<String>) -> Self {
        self.sheets = Some(sheets.into());
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn with_mapping<I, K, V>(mut self, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.mapping = Some(
            mapping
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Whether row 0 of each sheet is a header row.
    pub fn includes_headers(&self) -> bool {
        self.include_headers.unwrap_or(false)
    }

    /// Selected sheets as 0-based indices, in the order given.
    pub fn sheet_indices(&self) -> IngestionResult<Vec<usize>> {
        match self.sheets.as_deref().map(str::trim) {
            None | Some("") => Ok(vec![0]),
            Some(list) => parse_one_based_list("sheets", list),
        }
    }

    /// CSV field separator as a single byte.
    pub fn separator_byte(&self) -> IngestionResult<u8> {
        let Some(sep) = self.separator.as_deref().filter(|s| !s.is_empty()) else {
            return Ok(b',');
        };
        match sep.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(IngestionError::SchemaMismatch {
                message: format!("separator must be a single ASCII character, got '{sep}'"),
            }),
        }
    }
}
