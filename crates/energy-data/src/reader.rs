//! CSV file discovery and loading for the campus energy report.
//!
//! Each `*.csv` file in the data directory holds one building's meter
//! readings; the file stem becomes the building identifier.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use energy_core::models::{Dataset, MeterReading, BUILDING_COLUMN, KWH_COLUMN, TIMESTAMP_COLUMN};
use energy_core::time_utils::TimezoneHandler;
use energy_core::{EnergyError, Result};
use tracing::{debug, warn};

// ── Public types ──────────────────────────────────────────────────────────────

/// A file that was found but contributed no readings.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// What happened to each file during one ingestion pass.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub files_found: usize,
    pub files_loaded: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
    pub rows_loaded: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` files directly inside `data_path`, sorted by path.
pub fn find_csv_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "csv")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Building identifier for a CSV file: its file stem.
pub fn building_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Load every building file under `data_path` into one [`Dataset`].
///
/// A file that cannot be read, lacks the `timestamp` or `kwh` column, or
/// holds an unparseable timestamp or non-numeric kWh value is skipped with a warning;
/// the remaining files still load. An empty dataset means there was no
/// usable data.
pub fn load_dataset(data_path: &Path, tz: &TimezoneHandler) -> (Dataset, IngestReport) {
    let files = find_csv_files(data_path);
    let mut report = IngestReport {
        files_found: files.len(),
        ..IngestReport::default()
    };
    let mut dataset = Dataset::new();

    if files.is_empty() {
        warn!("No CSV files found in {}", data_path.display());
        return (dataset, report);
    }

    for path in &files {
        match read_building_file(path, tz) {
            Ok((readings, extra_columns)) => {
                debug!("File {}: {} readings", path.display(), readings.len());
                report.rows_loaded += readings.len();
                report.files_loaded.push(path.clone());
                dataset.extend(readings, &extra_columns);
            }
            Err(e) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                warn!("Skipping {}: {}", name, e);
                report.skipped.push(SkippedFile {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        "Loaded {} readings from {} of {} files",
        report.rows_loaded,
        report.files_loaded.len(),
        report.files_found
    );

    (dataset, report)
}

/// Parse one building file.
///
/// Rows whose kWh cell is blank or an NA marker are dropped with a warning;
/// any other unparseable kWh value fails the whole file.
///
/// Returns the readings in row order plus the names of the pass-through
/// columns (every header other than `timestamp`, `kwh` and `building`,
/// which is always taken from the file name).
pub fn read_building_file(
    path: &Path,
    tz: &TimezoneHandler,
) -> Result<(Vec<MeterReading>, Vec<String>)> {
    let file = File::open(path).map_err(|source| EnergyError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let csv_err = |source: csv::Error| EnergyError::CsvParse {
        path: path.to_path_buf(),
        source,
    };

    let headers = reader.headers().map_err(csv_err)?.clone();
    let ts_idx = column_index(&headers, TIMESTAMP_COLUMN, path)?;
    let kwh_idx = column_index(&headers, KWH_COLUMN, path)?;

    let extra_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, name)| *i != ts_idx && *i != kwh_idx && *name != BUILDING_COLUMN)
        .map(|(i, name)| (i, name.to_string()))
        .collect();

    let building = building_id(path);
    let mut readings = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(csv_err)?;

        let ts_raw = record.get(ts_idx).unwrap_or("");
        let timestamp =
            tz.parse_timestamp(ts_raw)
                .ok_or_else(|| EnergyError::TimestampParse {
                    path: path.to_path_buf(),
                    line,
                    value: ts_raw.to_string(),
                })?;

        let kwh_raw = record.get(kwh_idx).unwrap_or("");
        let kwh = match parse_kwh(kwh_raw) {
            KwhCell::Value(kwh) => kwh,
            KwhCell::Missing => {
                warn!(
                    "{} line {}: missing kWh value, row dropped",
                    path.display(),
                    line
                );
                continue;
            }
            KwhCell::Invalid => {
                return Err(EnergyError::EnergyValue {
                    path: path.to_path_buf(),
                    line,
                    value: kwh_raw.to_string(),
                })
            }
        };

        let extra: BTreeMap<String, String> = extra_columns
            .iter()
            .map(|(i, name)| (name.clone(), record.get(*i).unwrap_or("").to_string()))
            .collect();

        readings.push(MeterReading::new(timestamp, kwh, building.clone()).with_extra(extra));
    }

    Ok((
        readings,
        extra_columns.into_iter().map(|(_, name)| name).collect(),
    ))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn column_index(headers: &csv::StringRecord, column: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| EnergyError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
}

/// Cell spellings read as "no reading" rather than as a malformed value.
const MISSING_KWH_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "#N/A", "#NA", "<NA>", "NULL", "null",
    "None",
];

#[derive(Debug, Clone, Copy, PartialEq)]
enum KwhCell {
    Value(f64),
    Missing,
    Invalid,
}

fn parse_kwh(raw: &str) -> KwhCell {
    if MISSING_KWH_MARKERS.contains(&raw) {
        return KwhCell::Missing;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => KwhCell::Value(v),
        _ => KwhCell::Invalid,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
