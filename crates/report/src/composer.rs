//! Report composition entry point.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, error};
use validator::Validate;

use domain::models::{RawReportRequest, ReportKind, ReportRequest};

use crate::error::ReportError;
use crate::filename::FileNamer;
use crate::footer::FooterStamper;
use crate::header::HeaderRenderer;
use crate::pdf::PdfSurface;
use crate::render::BlockRenderer;
use crate::sections::SectionBuilder;
use crate::surface::DocumentSurface;
use crate::theme::ReportTheme;

/// A finished report, not yet saved anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReport {
    pub kind: ReportKind,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Turns report requests into PDF documents.
///
/// Cheap to clone; the theme is shared. Each call builds its own document, so
/// concurrent calls never share drawing state.
#[derive(Debug, Clone)]
pub struct ReportComposer {
    theme: Arc<ReportTheme>,
    offset: FixedOffset,
}

impl ReportComposer {
    /// `offset` is the zone used for every printed and file-name timestamp.
    pub fn new(theme: ReportTheme, offset: FixedOffset) -> Self {
        Self {
            theme: Arc::new(theme),
            offset,
        }
    }

    pub fn theme(&self) -> &ReportTheme {
        &self.theme
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Resolves a wire request into a typed one.
    ///
    /// Rejections are logged the same way as failures in [`generate_at`].
    ///
    /// [`generate_at`]: ReportComposer::generate_at
    pub fn resolve(&self, raw: RawReportRequest) -> Result<ReportRequest, ReportError> {
        let kind = raw.kind.clone();
        ReportRequest::try_from(raw).map_err(|e| {
            let err = ReportError::from(e);
            error!(kind = %kind, error = %err, "Report generation failed");
            err
        })
    }

    /// Parses a wire request and generates it.
    pub fn generate_raw(&self, raw: RawReportRequest) -> Result<GeneratedReport, ReportError> {
        let request = self.resolve(raw)?;
        self.generate(&request)
    }

    pub fn generate(&self, request: &ReportRequest) -> Result<GeneratedReport, ReportError> {
        self.generate_at(request, Utc::now())
    }

    /// Generates a report as if at `now`.
    ///
    /// Errors are logged here and returned unchanged; no partial document
    /// ever leaves this function.
    pub fn generate_at(
        &self,
        request: &ReportRequest,
        now: DateTime<Utc>,
    ) -> Result<GeneratedReport, ReportError> {
        let kind = request.kind();
        let started = Instant::now();

        let result = self.render_pdf(request, now);
        match &result {
            Ok(report) => debug!(
                kind = %kind,
                file_name = %report.file_name,
                pages = report.page_count,
                bytes = report.bytes.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Report generated"
            ),
            Err(e) => error!(kind = %kind, error = %e, "Report generation failed"),
        }
        result
    }

    fn render_pdf(
        &self,
        request: &ReportRequest,
        now: DateTime<Utc>,
    ) -> Result<GeneratedReport, ReportError> {
        request.validate()?;

        let at = now.with_timezone(&self.offset);
        let file_name = FileNamer::file_name(request, &at);
        let title = file_name.trim_end_matches(".pdf").to_string();

        let mut surface = PdfSurface::new(&title, self.theme.geometry)?;
        self.compose(&mut surface, request, &at)?;
        let page_count = surface.page_count();
        let bytes = surface.finish()?;

        Ok(GeneratedReport {
            kind: request.kind(),
            file_name,
            bytes,
            page_count,
        })
    }

    /// Draws masthead, body and footers onto `surface`.
    ///
    /// Footers are stamped last so the page total is final.
    pub fn compose<S: DocumentSurface>(
        &self,
        surface: &mut S,
        request: &ReportRequest,
        at: &DateTime<FixedOffset>,
    ) -> Result<(), ReportError> {
        HeaderRenderer::new(&self.theme).draw(surface, request.kind(), at)?;

        let blocks = SectionBuilder::new(self.offset).build(request);
        BlockRenderer::new(&self.theme).draw(
            surface,
            &blocks,
            self.theme.geometry.first_page_top,
        )?;

        FooterStamper::new(&self.theme).stamp(surface, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    /// Log sink for asserting on formatted output.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }
    use crate::surface::recording::RecordingSurface;
    use chrono::TimeZone;
    use domain::models::ReportPayload;
    use serde_json::json;

    fn composer() -> ReportComposer {
        ReportComposer::new(ReportTheme::default(), FixedOffset::east_opt(0).unwrap())
    }

    fn at() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, 9, 7, 0)
            .unwrap()
    }

    fn request(kind: ReportKind, payload: serde_json::Value, context: Option<&str>) -> ReportRequest {
        ReportRequest::new(
            ReportPayload::resolve(kind, payload).unwrap(),
            context.map(str::to_string),
        )
    }

    fn record(request: &ReportRequest, at: &DateTime<FixedOffset>) -> RecordingSurface {
        let composer = composer();
        let mut surface = RecordingSurface::new(composer.theme().geometry);
        composer.compose(&mut surface, request, at).unwrap();
        surface
    }

    fn many_devices(count: usize) -> serde_json::Value {
        let devices: Vec<_> = (0..count)
            .map(|i| json!({"system_id": format!("SYS-{:03}", i), "status": "online", "cpu_score": 50}))
            .collect();
        json!({ "devices": devices })
    }

    #[test]
    fn test_compose_global() {
        let req = request(
            ReportKind::Global,
            json!({"locations": [{"city": "Pune", "total_labs": 2, "total_pcs": 10, "online": 7}]}),
            None,
        );
        let surface = record(&req, &at());

        assert_eq!(surface.page_count(), 1);
        assert!(surface.has_text("GLOBAL LEVEL AUDIT"));
        assert!(surface.has_text("REGIONAL INFRASTRUCTURE DISTRIBUTION"));
        assert!(surface.has_text("PUNE"));
        assert!(surface.has_text("PAGE 1 OF 1"));
    }

    #[test]
    fn test_footer_counts_every_page() {
        let req = request(ReportKind::Lab, many_devices(80), Some("Main Hall A"));
        let surface = record(&req, &at());

        let pages = surface.page_count();
        assert!(pages >= 3);
        for page in 0..pages {
            let label = format!("PAGE {} OF {}", page + 1, pages);
            assert!(surface.texts_on(page).contains(&label.as_str()));
        }
        // Masthead only on the first page.
        assert!(surface.texts_on(0).contains(&"LAB GUARDIAN PRO"));
        assert!(!surface.texts_on(1).contains(&"LAB GUARDIAN PRO"));
        // First and last stations both made it in.
        assert!(surface.has_text("SYS-000"));
        assert!(surface.has_text("SYS-079"));
    }

    #[test]
    fn test_identical_inputs_draw_identically() {
        let req = request(
            ReportKind::Pc,
            json!({"system_id": "HW-1", "app_usage": {"Chrome": 3600, "Word": 1800, "Zoom": 1800}}),
            None,
        );
        let first = record(&req, &at()).finish().unwrap();
        let second = record(&req, &at()).finish().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_at_produces_pdf() {
        let req = request(ReportKind::Lab, json!({"devices": []}), Some("Main Hall A"));
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 7, 0).unwrap();
        let report = composer().generate_at(&req, now).unwrap();

        assert_eq!(report.kind, ReportKind::Lab);
        assert_eq!(report.file_name, "Lab_Level_Report_Main_Hall_A_2024-05-01_09-07.pdf");
        assert_eq!(report.page_count, 1);
        assert!(report.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_generate_rejects_invalid_context() {
        let req = request(ReportKind::City, json!({}), Some("bad\u{0}name"));
        let err = composer().generate(&req).unwrap_err();
        assert!(matches!(err, ReportError::Invalid(_)));
    }

    #[test]
    fn test_generate_raw_unsupported_kind() {
        let raw = RawReportRequest {
            kind: "REGION".to_string(),
            payload: json!({}),
            context: None,
        };
        let err = composer().generate_raw(raw).unwrap_err();
        assert_eq!(err.to_string(), "unsupported report kind: REGION");
    }

    #[test]
    fn test_rejected_requests_are_logged() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, || {
            composer().generate_raw(RawReportRequest {
                kind: "REGION".to_string(),
                payload: json!({}),
                context: None,
            })
        });

        assert!(result.is_err());
        let output = logs.contents();
        assert!(output.contains("Report generation failed"), "{}", output);
        assert!(output.contains("unsupported report kind: REGION"), "{}", output);
    }

    #[test]
    fn test_malformed_payload_is_logged() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, || {
            composer().resolve(RawReportRequest {
                kind: "CITY".to_string(),
                payload: json!({"labs": "none"}),
                context: None,
            })
        });

        assert!(matches!(result, Err(ReportError::Payload(_))));
        assert!(logs.contents().contains("Report generation failed"));
    }

    #[test]
    fn test_offset_applies_to_file_name() {
        let composer = ReportComposer::new(
            ReportTheme::default(),
            FixedOffset::east_opt(5 * 3600 + 1800).unwrap(),
        );
        let req = request(ReportKind::Global, json!({}), None);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 20, 45, 0).unwrap();
        let report = composer.generate_at(&req, now).unwrap();
        assert_eq!(report.file_name, "Global_Level_Report_2024-05-02_02-15.pdf");
    }
}
