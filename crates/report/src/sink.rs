//! Persisting finished reports to disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::composer::GeneratedReport;
use crate::error::ReportError;

/// Writes reports into a directory.
///
/// Each report is written to a temporary file in the target directory and
/// renamed into place, so a partially written file never carries the final
/// name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves `report` and returns the final path.
    pub fn save(&self, report: &GeneratedReport) -> Result<PathBuf, ReportError> {
        std::fs::create_dir_all(&self.dir)?;

        let target = self.dir.join(&report.file_name);
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(&report.bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(&target).map_err(|e| ReportError::Io(e.error))?;

        info!(
            kind = %report.kind,
            path = %target.display(),
            bytes = report.bytes.len(),
            "Report saved"
        );
        Ok(target)
    }
}
