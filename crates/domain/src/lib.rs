//! Domain layer for Lab Guardian.
//!
//! This crate contains:
//! - Lenient view models for backend statistics (cities, labs, stations)
//! - The tagged report payload union and request validation
//! - Report aggregation and liveness services

pub mod models;
pub mod services;
