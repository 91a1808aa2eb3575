use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by the ingestion pipeline.
///
/// This is a single error enum shared across the readers (CSV/JSON/XML and optional Excel), the
/// mapping resolver, the transformers and the assembly service.
///
/// An unknown visualization type is deliberately *not* represented here: providers report it as
/// `Ok(None)`.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Excel reading error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV reading error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON document.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed XML document.
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The file content does not have the shape the visualization type requires.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A mapping selector is not a comma-separated list of 1-based column numbers.
    #[error("invalid column selector for '{field}': '{selector}' ({message})")]
    InvalidSelector {
        field: String,
        selector: String,
        message: String,
    },

    /// No project is flagged active in the project collaborator.
    #[error("No active project")]
    NoActiveProject,

    /// The caller did not send any file details (or sent them without a file type).
    #[error("No file details were provided")]
    MissingFileDetails,

    /// The file type is not one of EXCEL, JSON, CSV or XML.
    #[error("Invalid file type provided")]
    InvalidFileType,

    /// Tabular files need a column mapping.
    #[error("No mapping was provided for {file_type} files")]
    MissingMapping { file_type: String },

    /// Neither the file nor the caller named a visualization type.
    #[error("No visualization type was provided")]
    MissingVisualizationType,

    /// The assembled visualization failed schema validation.
    #[error("{message}")]
    Validation { message: String },

    /// A store collaborator failed.
    #[error("store error: {message}")]
    Store { message: String },
}
