//! Domain services for Lab Guardian.
//!
//! Services hold the report arithmetic and status derivation that operate on
//! the view models.

pub mod aggregation;
pub mod liveness;

pub use aggregation::{
    lab_perf_score, recent_history, top_apps, weighted_performance, AppShare, CityOverview,
    FleetOverview, GlobalOverview, HISTORY_LIMIT, TOP_APPS_LIMIT,
};
pub use liveness::{is_station_online, mark_liveness, LIVENESS_WINDOW_SECS};
