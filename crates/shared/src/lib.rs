//! Shared utilities and common types for Lab Guardian.
//!
//! This crate provides functionality used across the other crates:
//! - Display formatting for percentages, durations and timestamps
//! - Common validation logic

pub mod format;
pub mod validation;
