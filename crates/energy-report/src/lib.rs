//! Reporting layer for the campus energy report.
//!
//! Renders the dashboard image and writes the cleaned dataset, the
//! per-building summary and the highlights text file.

pub mod dashboard;
pub mod writer;

pub use writer::{write_report, Highlights, ReportPaths};
