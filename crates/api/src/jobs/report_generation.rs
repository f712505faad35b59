//! Scheduled report jobs.
//!
//! The daily job renders the GLOBAL report into the output directory; the
//! cleanup job prunes saved reports past their retention.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use domain::models::{ReportPayload, ReportRequest};
use report::DirectorySink;

use crate::services::{FleetSource, ReportExporter};

use super::scheduler::{Job, JobFrequency};

/// Background job that saves a GLOBAL report once a day.
pub struct DailyReportJob {
    fleet: Arc<dyn FleetSource>,
    exporter: ReportExporter,
    sink: DirectorySink,
}

impl DailyReportJob {
    pub fn new(fleet: Arc<dyn FleetSource>, exporter: ReportExporter, output_dir: PathBuf) -> Self {
        Self {
            fleet,
            exporter,
            sink: DirectorySink::new(output_dir),
        }
    }
}

#[async_trait::async_trait]
impl Job for DailyReportJob {
    fn name(&self) -> &'static str {
        "daily_report"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Daily
    }

    async fn execute(&self) -> Result<(), String> {
        let payload = self
            .fleet
            .locations()
            .await
            .map_err(|e| format!("Failed to fetch location stats: {}", e))?;
        let cities = payload.locations.len();

        let path = self
            .exporter
            .export_to(ReportRequest::new(ReportPayload::Global(payload), None), &self.sink)
            .await
            .map_err(|e| format!("Failed to save daily report: {}", e))?;

        info!(path = %path.display(), cities = cities, "Daily report saved");
        Ok(())
    }
}

/// Background job to delete saved reports past retention.
pub struct ReportCleanupJob {
    reports_dir: PathBuf,
    retention: Duration,
}

impl ReportCleanupJob {
    pub fn new(reports_dir: PathBuf, retention_days: u32) -> Self {
        Self {
            reports_dir,
            retention: Duration::from_secs(u64::from(retention_days) * 86400),
        }
    }
}

#[async_trait::async_trait]
impl Job for ReportCleanupJob {
    fn name(&self) -> &'static str {
        "report_cleanup"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Hourly
    }

    fn run_on_start(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), String> {
        let dir = self.reports_dir.clone();
        let retention = self.retention;

        let deleted = tokio::task::spawn_blocking(move || {
            remove_expired_reports(&dir, retention, SystemTime::now())
        })
        .await
        .map_err(|e| format!("Cleanup task failed: {}", e))?
        .map_err(|e| format!("Failed to cleanup expired reports: {}", e))?;

        if deleted > 0 {
            info!(deleted = deleted, "Cleaned up expired reports");
        }
        Ok(())
    }
}

/// Deletes `*.pdf` files in `dir` last modified more than `retention` before
/// `now`. Returns the number of files removed; a missing directory is empty.
pub fn remove_expired_reports(dir: &Path, retention: Duration, now: SystemTime) -> io::Result<usize> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let Some(cutoff) = now.checked_sub(retention) else {
        return Ok(0);
    };

    let mut deleted = 0;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !is_report_file(&path) {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() || metadata.modified()? >= cutoff {
            continue;
        }

        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Deleted expired report");
                deleted += 1;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete expired report"),
        }
    }
    Ok(deleted)
}

fn is_report_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
