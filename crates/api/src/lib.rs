//! Lab Guardian report service.
//!
//! Serves PDF audit reports over HTTP and renders a scheduled daily report.

pub mod app;
pub mod config;
pub mod error;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod services;
