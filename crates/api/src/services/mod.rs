//! Service layer: backend access and report export.

pub mod fleet_client;
pub mod report_export;

pub use fleet_client::{BackendError, FleetSource, HttpFleetClient};
pub use report_export::{ReportExportError, ReportExporter};
