//! Unified file-to-visualization entrypoint.
//!
//! Most callers should use [`files_to_visualizations`], which reads every uploaded file, picks the
//! visualization type and runs the matching provider from [`crate::transform`].
//!
//! - Files are read one after the other.
//! - If an [`super::observability::IngestionObserver`] is configured, each file's
//!   success/failure/alert is reported to it.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::{FileDetails, FileProperties, FileType};
use crate::error::{IngestionError, IngestionResult};
use crate::mapping::ColumnMapping;
use crate::transform::{self, meta};
use crate::types::{TypeSelection, VisualizationDraft, VisualizationType};

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::record::Record;
use super::{csv, json, xml};

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Decode one file's bytes into intermediate records according to `details`.
///
/// CSV and Excel yield a single [`Record::Table`]; JSON yields one [`Record::Document`] per
/// document; XML yields one document tree.
pub fn decode_records(bytes: &[u8], details: &FileDetails) -> IngestionResult<Vec<Record>> {
    match details.file_type {
        Some(FileType::Csv) => {
            let table = csv::read_csv_from_bytes(bytes, details.separator_byte()?)?;
            Ok(vec![Record::Table(table)])
        }
        Some(FileType::Excel) => decode_excel(bytes, details),
        Some(FileType::Json) => {
            let docs = json::read_json_from_str(utf8(bytes)?)?;
            Ok(docs.into_iter().map(Record::Document).collect())
        }
        Some(FileType::Xml) => Ok(vec![Record::Document(xml::read_xml_from_str(utf8(bytes)?)?)]),
        Some(FileType::Unsupported) => Err(IngestionError::InvalidFileType),
        None => Err(IngestionError::MissingFileDetails),
    }
}

fn utf8(bytes: &[u8]) -> IngestionResult<&str> {
    std::str::from_utf8(bytes)
        .map(|s| s.trim_start_matches('\u{feff}'))
        .map_err(|e| IngestionError::SchemaMismatch {
            message: format!("file is not valid UTF-8: {e}"),
        })
}

fn decode_excel(bytes: &[u8], details: &FileDetails) -> IngestionResult<Vec<Record>> {
    // Avoid unused warnings when the feature is off.
    let _ = (bytes, details);

    #[cfg(feature = "excel")]
    {
        let table = super::excel::read_excel_from_bytes(bytes, &details.sheet_indices()?)?;
        Ok(vec![Record::Table(table)])
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(IngestionError::SchemaMismatch {
            message: "excel ingestion not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

/// Read one uploaded file into intermediate records.
pub async fn read_file(file: &FileProperties, details: &FileDetails) -> IngestionResult<Vec<Record>> {
    let bytes = tokio::fs::read(&file.file_path).await?;
    decode_records(&bytes, details)
}

/// Read every file and transform its records into visualization drafts.
///
/// The visualization type of each record is the file's own type and the caller's `target` type,
/// in that order of preference when `include_all` is set and in the reverse order otherwise. Records
/// whose type has no transformer are skipped.
///
/// When an observer is configured, this function reports per file:
///
/// - `on_success`, with the number of drafts produced
/// - `on_failure`, with a computed severity
/// - `on_alert`, when the computed severity is >= `options.alert_at_or_above`
pub async fn files_to_visualizations(
    files: &[FileProperties],
    details: &FileDetails,
    target: Option<&TypeSelection>,
    include_all: bool,
    options: &IngestionOptions,
) -> IngestionResult<Vec<VisualizationDraft>> {
    let file_type = details.file_type.ok_or(IngestionError::MissingFileDetails)?;
    let mapping = if file_type.is_tabular() {
        let raw = details
            .mapping
            .as_ref()
            .ok_or_else(|| IngestionError::MissingMapping {
                file_type: file_type.as_str().to_string(),
            })?;
        Some(ColumnMapping::parse(raw)?)
    } else {
        None
    };

    let mut drafts = Vec::new();
    for file in files {
        let ctx = IngestionContext {
            path: file.file_path.clone(),
            file_type,
        };
        let result = match read_file(file, details).await {
            Ok(records) => records_to_drafts(records, details, mapping.as_ref(), target, include_all),
            Err(e) => Err(e),
        };
        report(options, &ctx, &result);
        drafts.extend(result?);
    }
    Ok(drafts)
}

/// Transform the records of one file.
pub fn records_to_drafts(
    records: Vec<Record>,
    details: &FileDetails,
    mapping: Option<&ColumnMapping>,
    target: Option<&TypeSelection>,
    include_all: bool,
) -> IngestionResult<Vec<VisualizationDraft>> {
    let mut drafts = Vec::with_capacity(records.len());
    for record in records {
        let (selection, draft) = match (&record, details.file_type) {
            (Record::Table(table), _) => {
                let selection = target.cloned().ok_or(IngestionError::MissingVisualizationType)?;
                let mapping = mapping.ok_or_else(|| IngestionError::MissingMapping {
                    file_type: details
                        .file_type
                        .map(FileType::as_str)
                        .unwrap_or_default()
                        .to_string(),
                })?;
                let kind = primary(&selection)?;
                let draft = transform::tabular_provider(
                    kind,
                    table,
                    mapping,
                    details.includes_headers(),
                    include_all,
                )?;
                (selection, draft)
            }
            (Record::Document(doc), Some(FileType::Xml)) => {
                let own = meta::xml_root(doc).and_then(meta::xml_type);
                let selection = select_type(own, target, include_all)?;
                let draft = transform::xml_provider(primary(&selection)?, doc, include_all)?;
                (selection, draft)
            }
            (Record::Document(doc), _) => {
                let own = meta::document_type(doc);
                let selection = select_type(own, target, include_all)?;
                let draft = transform::json_provider(&selection, doc, include_all)?;
                (selection, draft)
            }
        };

        match draft {
            Some(mut draft) => {
                debug!(kind = ?selection, "record transformed");
                draft.kind = Some(selection);
                drafts.push(draft);
            }
            None => warn!(kind = ?selection, "skipping record: no transformer for visualization type"),
        }
    }
    Ok(drafts)
}

fn select_type(
    own: Option<TypeSelection>,
    target: Option<&TypeSelection>,
    include_all: bool,
) -> IngestionResult<TypeSelection> {
    let selection = if include_all {
        own.or_else(|| target.cloned())
    } else {
        target.cloned().or(own)
    };
    selection.ok_or(IngestionError::MissingVisualizationType)
}

fn primary(selection: &TypeSelection) -> IngestionResult<&VisualizationType> {
    selection
        .primary()
        .ok_or(IngestionError::MissingVisualizationType)
}

fn report(
    options: &IngestionOptions,
    ctx: &IngestionContext,
    result: &IngestionResult<Vec<VisualizationDraft>>,
) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    match result {
        Ok(drafts) => obs.on_success(
            ctx,
            IngestionStats {
                visualizations: drafts.len(),
            },
        ),
        Err(e) => {
            let sev = severity_for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

/// Severity of a file-level failure. I/O problems are Critical; content problems are Error.
pub fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        #[cfg(feature = "excel")]
        IngestionError::Excel(err) => {
            if error_chain_contains_io(err) {
                IngestionSeverity::Critical
            } else {
                IngestionSeverity::Error
            }
        }
        IngestionError::Xml(quick_xml::Error::Io(_)) => IngestionSeverity::Critical,
        IngestionError::Xml(_)
        | IngestionError::Json(_)
        | IngestionError::SchemaMismatch { .. }
        | IngestionError::InvalidSelector { .. }
        | IngestionError::MissingMapping { .. }
        | IngestionError::MissingVisualizationType
        | IngestionError::Validation { .. } => IngestionSeverity::Error,
        IngestionError::NoActiveProject
        | IngestionError::MissingFileDetails
        | IngestionError::InvalidFileType => IngestionSeverity::Warning,
        IngestionError::Store { .. } => IngestionSeverity::Critical,
    }
}

#[cfg(feature = "excel")]
fn error_chain_contains_io(e: &(dyn std::error::Error + 'static)) -> bool {
    let mut cur: Option<&(dyn std::error::Error + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}
