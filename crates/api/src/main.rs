use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use lab_guardian_api::{
    app::{create_router, AppState},
    config::Config,
    jobs::{DailyReportJob, JobScheduler, ReportCleanupJob},
    middleware::{init_metrics, logging::init_logging},
    services::{FleetSource, HttpFleetClient},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load().context("Failed to load configuration")?;

    init_logging(&config.logging);
    init_metrics().map_err(anyhow::Error::msg)?;

    info!("Starting Lab Guardian v{}", env!("CARGO_PKG_VERSION"));

    let fleet: Arc<dyn FleetSource> = Arc::new(
        HttpFleetClient::new(&config.backend).context("Failed to create fleet backend client")?,
    );
    info!(backend = %config.backend.base_url, "Fleet backend configured");

    let addr = config.socket_addr()?;
    let state = AppState::new(Arc::new(config), fleet.clone());

    let mut scheduler = JobScheduler::new();
    let reports = &state.config.reports;
    if reports.daily_enabled {
        scheduler.register(DailyReportJob::new(
            fleet,
            state.exporter.clone(),
            reports.output_dir.clone(),
        ));
    }
    if reports.retention_days > 0 {
        scheduler.register(ReportCleanupJob::new(
            reports.output_dir.clone(),
            reports.retention_days,
        ));
    }
    scheduler.start();

    let app = create_router(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error occurred")?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(30)).await;

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    warn!("Received shutdown signal");
}
