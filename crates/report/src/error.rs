//! Report generation errors.

use domain::models::PayloadError;
use thiserror::Error;

/// Errors raised while composing or saving a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("Invalid report request: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("PDF backend error: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    pub fn layout(msg: impl Into<String>) -> Self {
        ReportError::Layout(msg.into())
    }

    /// True when the caller supplied an unusable request, as opposed to a
    /// failure while drawing or saving.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ReportError::Payload(_) | ReportError::Invalid(_))
    }
}

impl From<printpdf::Error> for ReportError {
    fn from(err: printpdf::Error) -> Self {
        ReportError::Pdf(err.to_string())
    }
}
