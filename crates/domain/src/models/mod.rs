//! View models for Lab Guardian backend responses and report requests.

pub mod device;
pub mod history;
pub mod lab;
pub mod lenient;
pub mod location;
pub mod report;
pub mod score;

pub use device::{DeviceDetail, DeviceFilter, DeviceList, DeviceRecord, DeviceStatus};
pub use history::HistoryEntry;
pub use lab::LabSummary;
pub use location::LocationSummary;
pub use report::{
    CityPayload, GlobalPayload, LabPayload, PayloadError, PcPayload, RawReportRequest,
    ReportKind, ReportPayload, ReportRequest, SystemScope,
};
pub use score::{coerce_score, resolve_score, ScoreFields, Scored};
