use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the energy pipeline.
#[derive(Error, Debug)]
pub enum EnergyError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV document could not be parsed.
    #[error("Failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from a CSV header row.
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// A timestamp string did not match any recognised format.
    #[error("Invalid timestamp format in {path} line {line}: {value}")]
    TimestampParse {
        path: PathBuf,
        line: usize,
        value: String,
    },

    /// An energy value was not a finite number.
    #[error("Invalid kWh value in {path} line {line}: {value}")]
    EnergyValue {
        path: PathBuf,
        line: usize,
        value: String,
    },

    /// No usable CSV files were found under the given directory.
    #[error("No usable data in {0}")]
    NoData(PathBuf),

    /// An output artefact could not be written.
    #[error("Failed to write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dashboard image could not be rendered.
    #[error("Chart rendering failed: {0}")]
    Chart(String),
}

/// Convenience alias used throughout the energy crates.
pub type Result<T> = std::result::Result<T, EnergyError>;
