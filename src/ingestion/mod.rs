//! Format readers and the unified file entrypoint.
//!
//! Most callers go through [`files_to_visualizations`] (from [`unified`]) which:
//!
//! - reads each uploaded file according to its [`crate::config::FileDetails`]
//! - turns it into intermediate [`record::Record`]s
//! - hands the records to the matching provider in [`crate::transform`]
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific readers are also available under:
//! - [`csv`]
//! - [`json`]
//! - [`xml`]
//! - `excel` (behind the `excel` feature)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod json;
pub mod observability;
pub mod record;
pub mod unified;
pub mod xml;

pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    TracingObserver,
};
pub use record::{Cell, Record, Sheet, Table};
pub use unified::{
    IngestionOptions, decode_records, files_to_visualizations, read_file, records_to_drafts,
    severity_for_error,
};
