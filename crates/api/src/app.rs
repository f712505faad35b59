use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use report::{ReportComposer, ReportTheme};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{health, reports};
use crate::services::{FleetSource, ReportExporter};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fleet: Arc<dyn FleetSource>,
    pub exporter: ReportExporter,
}

impl AppState {
    pub fn new(config: Arc<Config>, fleet: Arc<dyn FleetSource>) -> Self {
        let composer = ReportComposer::new(ReportTheme::default(), config.report_offset());
        Self {
            config,
            fleet,
            exporter: ReportExporter::new(composer),
        }
    }
}

pub fn create_app(config: Config, fleet: Arc<dyn FleetSource>) -> Router {
    let state = AppState::new(Arc::new(config), fleet);
    create_router(state)
}

pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let report_routes = Router::new()
        .route(
            "/api/v1/reports",
            post(reports::create_report)
                .layer(DefaultBodyLimit::max(config.reports.max_payload_bytes)),
        )
        .route("/api/v1/reports/global", get(reports::global_report))
        .route("/api/v1/reports/cities/:city", get(reports::city_report))
        .route(
            "/api/v1/reports/cities/:city/labs/:lab",
            get(reports::lab_report),
        )
        .route("/api/v1/reports/systems", get(reports::systems_report))
        .route(
            "/api/v1/reports/devices/:system_id",
            get(reports::device_report),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(report_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            config.security.hsts_enabled,
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
