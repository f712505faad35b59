//! PDF audit report generation for Lab Guardian.
//!
//! [`ReportComposer`] takes a resolved report request, lays out the masthead,
//! the per-kind sections and the page footers, and returns the finished
//! document together with its file name. [`DirectorySink`] saves it.

pub mod composer;
pub mod error;
pub mod filename;
pub mod footer;
pub mod header;
pub mod layout;
pub mod pdf;
pub mod render;
pub mod sections;
pub mod sink;
pub mod surface;
pub mod table;
pub mod theme;

pub use composer::{GeneratedReport, ReportComposer};
pub use error::ReportError;
pub use sink::DirectorySink;
pub use theme::ReportTheme;
