//! Output file naming.

use chrono::{DateTime, FixedOffset};
use lazy_static::lazy_static;
use regex::Regex;

use domain::models::{ReportKind, ReportPayload, ReportRequest};
use shared::format::format_file_timestamp;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Derives `<Label>[_<context>]_<YYYY-MM-DD_HH-mm>.pdf` for a request.
pub struct FileNamer;

impl FileNamer {
    pub fn file_name(request: &ReportRequest, at: &DateTime<FixedOffset>) -> String {
        let kind = request.kind();
        let stamp = format_file_timestamp(at);

        match Self::subject(request) {
            Some(subject) => format!("{}_{}_{}.pdf", kind.file_label(), subject, stamp),
            None => format!("{}_{}.pdf", kind.file_label(), stamp),
        }
    }

    /// The context segment, already sanitized; `None` for kinds without one.
    fn subject(request: &ReportRequest) -> Option<String> {
        let context = request.context().filter(|c| !c.trim().is_empty());
        match request.kind() {
            ReportKind::Global | ReportKind::System => None,
            ReportKind::City | ReportKind::Lab => Some(sanitize(context.unwrap_or("Unknown"))),
            ReportKind::Pc => {
                let pc_name = match &request.payload {
                    ReportPayload::Pc(pc) => pc
                        .device
                        .pc_name
                        .as_deref()
                        .filter(|n| !n.trim().is_empty()),
                    _ => None,
                };
                Some(sanitize(pc_name.or(context).unwrap_or("System")))
            }
        }
    }
}

/// Collapses whitespace runs to `_` and replaces path separators with `-`.
fn sanitize(raw: &str) -> String {
    let flattened = raw.trim().replace(['/', '\\'], "-");
    WHITESPACE.replace_all(&flattened, "_").into_owned()
}
