//! Report download endpoints.
//!
//! `POST /api/v1/reports` renders a caller-supplied payload. The `GET`
//! routes fetch the same aggregates the dashboard shows from the fleet
//! backend and render them.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::info;

use domain::models::{
    DeviceFilter, DeviceRecord, LabPayload, PcPayload, RawReportRequest, ReportPayload,
    ReportRequest, SystemScope,
};
use domain::services::mark_liveness;
use report::GeneratedReport;
use shared::validation::{validate_context_label, validate_system_id};

use crate::app::AppState;
use crate::error::{ApiError, ValidationDetail};

/// Render a report from an explicit payload.
///
/// POST /api/v1/reports
pub async fn create_report(
    State(state): State<AppState>,
    body: Result<Json<RawReportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(raw) = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(format!(
                "Report payload exceeds {} bytes",
                state.config.reports.max_payload_bytes
            ))
        } else {
            ApiError::validation(rejection.body_text())
        }
    })?;

    let request = state.exporter.composer().resolve(raw)?;
    render(&state, request).await
}

/// GLOBAL report over every city.
///
/// GET /api/v1/reports/global
pub async fn global_report(State(state): State<AppState>) -> Result<Response, ApiError> {
    let payload = state.fleet.locations().await?;
    render(&state, ReportRequest::new(ReportPayload::Global(payload), None)).await
}

/// CITY report over one city's labs.
///
/// GET /api/v1/reports/cities/:city
pub async fn city_report(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Response, ApiError> {
    check_label("city", &city)?;

    let payload = state.fleet.city_labs(&city).await?;
    render(
        &state,
        ReportRequest::new(ReportPayload::City(payload), Some(city)),
    )
    .await
}

/// LAB report for one facility with its station inventory.
///
/// GET /api/v1/reports/cities/:city/labs/:lab
pub async fn lab_report(
    State(state): State<AppState>,
    Path((city, lab)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    check_label("city", &city)?;
    check_label("lab", &lab)?;

    let labs = state.fleet.city_labs(&city).await?;
    let summary = labs
        .labs
        .into_iter()
        .find(|summary| summary.matches_name(&lab))
        .ok_or_else(|| ApiError::NotFound(format!("Lab {} not found in {}", lab, city)))?;

    let filter = DeviceFilter {
        city: Some(city.clone()),
        lab: Some(summary.name().to_string()),
        ..DeviceFilter::default()
    };
    let listing = state.fleet.devices(&filter).await?;
    let devices = with_liveness(listing.devices, listing.server_time);

    let context = summary.lab_name.clone().unwrap_or(lab);
    let mut payload = LabPayload::from_summary(summary, devices);
    payload.city.get_or_insert(city);

    render(
        &state,
        ReportRequest::new(ReportPayload::Lab(payload), Some(context)),
    )
    .await
}

/// SYSTEM report over a filtered station listing.
///
/// GET /api/v1/reports/systems?city&lab&status&search
pub async fn systems_report(
    State(state): State<AppState>,
    Query(filter): Query<DeviceFilter>,
) -> Result<Response, ApiError> {
    let filter = normalize_filter(filter);
    let scope = filter.scope_label();
    if let Some(label) = &scope {
        check_label("scope", label)?;
    }

    let listing = state.fleet.devices(&filter).await?;
    let payload = LabPayload {
        lab: filter.lab.clone(),
        city: filter.city.clone(),
        devices: with_liveness(listing.devices, listing.server_time),
        ..LabPayload::default()
    };

    render(
        &state,
        ReportRequest::new(ReportPayload::System(SystemScope::Devices(payload)), scope),
    )
    .await
}

/// PC report for one station.
///
/// GET /api/v1/reports/devices/:system_id
pub async fn device_report(
    State(state): State<AppState>,
    Path(system_id): Path<String>,
) -> Result<Response, ApiError> {
    validate_system_id(&system_id).map_err(|e| field_error("system_id", e))?;

    let detail = state.fleet.device(&system_id).await?;
    let mut device = detail
        .device
        .ok_or_else(|| ApiError::NotFound(format!("Device {} not found", system_id)))?;
    mark_liveness(&mut device, detail.server_time, Utc::now());

    let payload = PcPayload {
        device,
        history: detail.history,
        session_count: detail.session_count,
    };
    render(
        &state,
        ReportRequest::new(ReportPayload::Pc(payload), Some(system_id)),
    )
    .await
}

async fn render(state: &AppState, request: ReportRequest) -> Result<Response, ApiError> {
    let kind = request.kind();
    let report = state.exporter.export(request).await?;

    info!(
        kind = %kind,
        file_name = %report.file_name,
        bytes = report.bytes.len(),
        "Report delivered"
    );
    Ok(pdf_response(report))
}

/// Wraps a finished report as a file download.
pub fn pdf_response(report: GeneratedReport) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, content_disposition(&report.file_name)),
        ],
        report.bytes,
    )
        .into_response()
}

/// RFC 5987 `attr-char`: everything else in `filename*` is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// `attachment` disposition with an ASCII `filename` and, for non-ASCII
/// names, the exact name as `filename*` (RFC 6266).
fn content_disposition(file_name: &str) -> HeaderValue {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    let value = if file_name.is_ascii() {
        format!("attachment; filename=\"{}\"", fallback)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            utf8_percent_encode(file_name, ATTR_CHAR)
        )
    };
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn with_liveness(
    mut devices: Vec<DeviceRecord>,
    server_time: Option<chrono::DateTime<Utc>>,
) -> Vec<DeviceRecord> {
    let now = Utc::now();
    for device in &mut devices {
        mark_liveness(device, server_time, now);
    }
    devices
}

/// Drops blank filter values; `status=all` means no status filter.
fn normalize_filter(filter: DeviceFilter) -> DeviceFilter {
    fn clean(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    DeviceFilter {
        city: clean(filter.city),
        lab: clean(filter.lab),
        status: clean(filter.status)
            .map(|s| s.to_ascii_lowercase())
            .filter(|s| s != "all"),
        search: clean(filter.search),
    }
}

fn check_label(field: &str, value: &str) -> Result<(), ApiError> {
    validate_context_label(value).map_err(|e| field_error(field, e))
}

fn field_error(field: &str, error: validator::ValidationError) -> ApiError {
    let message = error
        .message
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string());
    ApiError::Validation(
        message.clone(),
        Some(vec![ValidationDetail {
            field: field.to_string(),
            message,
        }]),
    )
}
