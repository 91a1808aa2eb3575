use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::FileType;
use crate::error::IngestionError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

/// Context about one file read.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// The uploaded file's path.
    pub path: PathBuf,
    /// Declared file type.
    pub file_type: FileType,
}

/// Stats reported on a successful file read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of visualizations produced from the file.
    pub visualizations: usize,
}

/// Observer interface for ingestion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called when a file is read and transformed.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when a file fails to read or transform.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Forwards ingestion events to `tracing`.
///
/// Successes are logged at `info`, failures at `warn` or `error` depending on severity, and alerts
/// at `error` with `alert = true`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            file_type = ctx.file_type.as_str(),
            path = %ctx.path.display(),
            visualizations = stats.visualizations,
            "file ingested"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        match severity {
            IngestionSeverity::Info | IngestionSeverity::Warning => tracing::warn!(
                file_type = ctx.file_type.as_str(),
                path = %ctx.path.display(),
                ?severity,
                %error,
                "file ingestion failed"
            ),
            IngestionSeverity::Error | IngestionSeverity::Critical => tracing::error!(
                file_type = ctx.file_type.as_str(),
                path = %ctx.path.display(),
                ?severity,
                %error,
                "file ingestion failed"
            ),
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            alert = true,
            file_type = ctx.file_type.as_str(),
            path = %ctx.path.display(),
            ?severity,
            %error,
            "file ingestion alert"
        );
    }
}
