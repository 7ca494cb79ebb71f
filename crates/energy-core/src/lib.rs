//! Shared building blocks for the campus energy pipeline.
//!
//! Holds the error type, the meter-reading model, timestamp parsing and
//! calendar bucketing, number formatting and the command-line settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{EnergyError, Result};
