//! Data layer for the campus energy report.
//!
//! Discovers and parses per-building CSV files, aggregates readings into
//! calendar buckets and per-building statistics, mirrors the totals through
//! a building object model and runs the top-level analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod buildings;
pub mod reader;

pub use energy_core as core;
