//! Report export service.
//!
//! Runs the PDF composer off the async runtime and records per-kind metrics.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use domain::models::ReportRequest;
use report::{DirectorySink, GeneratedReport, ReportComposer, ReportError};

use crate::middleware::metrics::{record_report_failed, record_report_generated};

/// Errors that can occur while exporting a report.
#[derive(Debug, Error)]
pub enum ReportExportError {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Report worker failed: {0}")]
    Worker(String),
}

/// Generates reports on the blocking pool.
///
/// Each call builds its own document on its own worker thread, so concurrent
/// exports share nothing but the immutable theme.
#[derive(Clone)]
pub struct ReportExporter {
    composer: ReportComposer,
}

impl ReportExporter {
    pub fn new(composer: ReportComposer) -> Self {
        Self { composer }
    }

    pub fn composer(&self) -> &ReportComposer {
        &self.composer
    }

    pub async fn export(&self, request: ReportRequest) -> Result<GeneratedReport, ReportExportError> {
        self.export_at(request, Utc::now()).await
    }

    pub async fn export_at(
        &self,
        request: ReportRequest,
        now: DateTime<Utc>,
    ) -> Result<GeneratedReport, ReportExportError> {
        let kind = request.kind();
        let composer = self.composer.clone();
        let started = Instant::now();

        let result = tokio::task::spawn_blocking(move || composer.generate_at(&request, now))
            .await
            .map_err(|e| ReportExportError::Worker(e.to_string()))
            .and_then(|generated| generated.map_err(ReportExportError::from));

        match &result {
            Ok(report) => {
                record_report_generated(kind.as_str(), started.elapsed().as_secs_f64());
                info!(
                    kind = %kind,
                    file_name = %report.file_name,
                    pages = report.page_count,
                    "Report exported"
                );
            }
            Err(e) => {
                record_report_failed(kind.as_str());
                warn!(kind = %kind, error = %e, "Report export failed");
            }
        }
        result
    }

    /// Exports and persists a report into `sink`.
    pub async fn export_to(
        &self,
        request: ReportRequest,
        sink: &DirectorySink,
    ) -> Result<PathBuf, ReportExportError> {
        let report = self.export(request).await?;
        let sink = sink.clone();
        tokio::task::spawn_blocking(move || sink.save(&report))
            .await
            .map_err(|e| ReportExportError::Worker(e.to_string()))?
            .map_err(ReportExportError::from)
    }
}
