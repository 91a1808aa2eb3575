//! `visualization-ingestion` turns uploaded data files into canonical visualization records.
//!
//! The primary entrypoint is [`service::VisualizationService::create_or_update_from_files`], which
//! reads every uploaded file, runs the transformer for the requested visualization type, merges the
//! caller's metadata, validates the result and upserts it into the active project.
//!
//! ## What you can ingest
//!
//! **File formats (declared by the caller through [`config::FileDetails`]):**
//!
//! - **JSON**: a full document (`name`, `description`, `tags`, `type` around a `data` member), a
//!   bare payload, or an array of either
//! - **XML**: the same layout as JSON, one element per field; repeated elements form lists
//! - **CSV**: rows of cells, read through a column mapping
//! - **Excel** (requires the Cargo feature `excel`, on by default): selected sheets, read through a
//!   column mapping
//!
//! **Visualization types and their payload shape:**
//!
//! | Types | Payload |
//! |-------|---------|
//! | sankey, force-directed-graph, hierarchical-edge-bundling, matrix | [`types::NodeLinkData`] |
//! | treemap, sunburst | [`types::HierarchyData`] |
//! | bar-chart, line-chart | [`types::AxisChartData`] |
//! | pie-chart, funnel | [`types::PieChartData`] |
//! | word-cloud | [`types::WordCloudData`] |
//! | calendar | [`types::CalendarData`] |
//! | scatter | [`types::ScatterData`] |
//! | timeline | [`types::TimelineData`] |
//!
//! Unknown type names are not an error: providers return `Ok(None)` and the record is skipped.
//!
//! ## Quick example: ingest an upload
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use visualization_ingestion::config::{FileDetails, FileProperties, FileType};
//! use visualization_ingestion::service::VisualizationService;
//! use visualization_ingestion::store::{InMemoryStore, Project};
//! use visualization_ingestion::types::{VisualizationType, VisualizationUpdate};
//!
//! # async fn run() -> Result<(), visualization_ingestion::IngestionError> {
//! let store = Arc::new(InMemoryStore::with_projects(vec![Project::new("demo", true)]));
//! let service = VisualizationService::new(store.clone(), store);
//!
//! let details = FileDetails::new(FileType::Csv)
//!     .with_headers(true)
//!     .with_mapping([("names", "1"), ("values", "2")]);
//! let update = VisualizationUpdate {
//!     name: Some("Budget".to_string()),
//!     kind: Some(VisualizationType::PieChart.into()),
//!     ..Default::default()
//! };
//! let created = service
//!     .create_or_update_from_files(
//!         &[FileProperties::new("budget.csv", "text/csv")],
//!         false,
//!         &update,
//!         Some(&details),
//!     )
//!     .await?;
//! println!("stored {} visualization(s)", created.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Column mappings
//!
//! Tabular files are read through a mapping from semantic field names (see [`mapping::fields`]) to
//! 1-based column selectors: `"3"` selects one column, `"7,8"` selects several. A blank selector
//! leaves the field unmapped.
//!
//! ```rust
//! use visualization_ingestion::ingestion::Cell;
//! use visualization_ingestion::transform::compute_axis_values;
//!
//! let row = vec![Cell::from(1.0), Cell::from("skip"), Cell::from(2.0), Cell::from(3.5)];
//! assert_eq!(compute_axis_values(&row, "0,2,3"), Some(vec![1.0, 2.0, 3.5]));
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: format readers and the unified file entrypoint
//! - [`mapping`]: column selectors and mapped rows
//! - [`transform`]: per-type transformers and provider dispatch
//! - [`validation`]: schema validation of assembled records
//! - [`store`]: project and visualization store interfaces, plus an in-memory store
//! - [`service`]: the assembly service tying all of the above together
//! - [`types`], [`config`], [`error`]: data model, call configuration and errors

pub mod config;
pub mod error;
pub mod ingestion;
pub mod mapping;
pub mod service;
pub mod store;
pub mod transform;
pub mod types;
pub mod validation;

pub use error::{IngestionError, IngestionResult};
pub use service::VisualizationService;
