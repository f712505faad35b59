//! Background job scheduler and job implementations.

mod report_generation;
mod scheduler;

pub use report_generation::{remove_expired_reports, DailyReportJob, ReportCleanupJob};
pub use scheduler::{Job, JobFrequency, JobScheduler};
