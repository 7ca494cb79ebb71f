//! Report artefacts written after a successful analysis.
//!
//! Any failure here is fatal for the run; nothing is retried.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use energy_core::models::{BuildingStats, Dataset, BUILDING_COLUMN, KWH_COLUMN, TIMESTAMP_COLUMN};
use energy_core::time_utils::TimezoneHandler;
use energy_core::{EnergyError, Result};
use energy_data::analysis::AnalysisResult;
use tracing::info;

use crate::dashboard::render_dashboard;

pub const DASHBOARD_FILE: &str = "dashboard.png";
pub const CLEANED_DATA_FILE: &str = "cleaned_energy_data.csv";
pub const BUILDING_SUMMARY_FILE: &str = "building_summary.csv";
pub const SUMMARY_FILE: &str = "summary.txt";

// ── ReportPaths ───────────────────────────────────────────────────────────────

/// Locations of the four report artefacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub dashboard: PathBuf,
    pub cleaned_data: PathBuf,
    pub building_summary: PathBuf,
    pub summary: PathBuf,
}

impl ReportPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            dashboard: dir.join(DASHBOARD_FILE),
            cleaned_data: dir.join(CLEANED_DATA_FILE),
            building_summary: dir.join(BUILDING_SUMMARY_FILE),
            summary: dir.join(SUMMARY_FILE),
        }
    }
}

// ── Highlights ────────────────────────────────────────────────────────────────

/// The three headline facts written to `summary.txt`.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlights {
    pub total_kwh: f64,
    pub top_building: String,
    pub peak_time: DateTime<Utc>,
    pub peak_kwh: f64,
}

impl Highlights {
    /// Derive highlights from a dataset and its building summary.
    ///
    /// The top building is the first, in summary order, with the largest
    /// sum. The peak is the first reading, in dataset order, with the largest
    /// kWh. Returns `None` for an empty dataset.
    pub fn compute(dataset: &Dataset, summary: &BTreeMap<String, BuildingStats>) -> Option<Self> {
        let peak = dataset.peak_reading()?;
        let top_building = summary
            .iter()
            .fold(None::<(&String, f64)>, |best, (name, stats)| match best {
                Some((_, sum)) if stats.sum <= sum => best,
                _ => Some((name, stats.sum)),
            })
            .map(|(name, _)| name.clone())?;

        Some(Self {
            total_kwh: dataset.total_kwh(),
            top_building,
            peak_time: peak.timestamp,
            peak_kwh: peak.kwh,
        })
    }

    /// The exact contents of `summary.txt`.
    pub fn render(&self, tz: &TimezoneHandler) -> String {
        format!(
            "Total campus consumption: {:.2} kWh\nHighest-consuming building: {}\nPeak load time: {}\n",
            self.total_kwh,
            self.top_building,
            tz.format_display_time(self.peak_time)
        )
    }
}

// ── Writers ───────────────────────────────────────────────────────────────────

/// Write every report artefact for `result` into `output_dir`.
///
/// Creates `output_dir` when missing. The dashboard is skipped when
/// `with_dashboard` is `false`.
pub fn write_report(
    result: &AnalysisResult,
    output_dir: &Path,
    tz: &TimezoneHandler,
    with_dashboard: bool,
) -> Result<ReportPaths> {
    std::fs::create_dir_all(output_dir).map_err(|source| EnergyError::OutputWrite {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let paths = ReportPaths::in_dir(output_dir);

    if with_dashboard {
        render_dashboard(
            &paths.dashboard,
            &result.daily,
            &result.mean_weekly,
            &result.hourly,
        )?;
    }

    write_cleaned_dataset(&paths.cleaned_data, &result.dataset, tz)?;
    write_building_summary(&paths.building_summary, &result.summary)?;

    let highlights = Highlights::compute(&result.dataset, &result.summary)
        .ok_or_else(|| EnergyError::NoData(output_dir.to_path_buf()))?;
    write_summary(&paths.summary, &highlights, tz)?;

    info!(
        "Report written to {} (top building: {}, peak {:.2} kWh)",
        output_dir.display(),
        highlights.top_building,
        highlights.peak_kwh
    );
    Ok(paths)
}

/// Write the unified dataset: `timestamp,kwh,<pass-through…>,building`, no index.
pub fn write_cleaned_dataset(path: &Path, dataset: &Dataset, tz: &TimezoneHandler) -> Result<()> {
    let mut writer = csv_writer(path)?;

    let mut header: Vec<&str> = vec![TIMESTAMP_COLUMN, KWH_COLUMN];
    header.extend(dataset.extra_columns.iter().map(String::as_str));
    header.push(BUILDING_COLUMN);
    writer.write_record(&header).map_err(|e| write_err(path, e))?;

    for reading in dataset.iter() {
        let mut row: Vec<String> = Vec::with_capacity(header.len());
        row.push(tz.format_timestamp(reading.timestamp));
        row.push(reading.kwh.to_string());
        row.extend(
            dataset
                .extra_columns
                .iter()
                .map(|c| reading.extra.get(c).cloned().unwrap_or_default()),
        );
        row.push(reading.building.clone());
        writer.write_record(&row).map_err(|e| write_err(path, e))?;
    }

    writer.flush().map_err(|source| EnergyError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Write one `building,mean,min,max,sum` row per building.
pub fn write_building_summary(path: &Path, summary: &BTreeMap<String, BuildingStats>) -> Result<()> {
    let mut writer = csv_writer(path)?;
    writer
        .write_record([BUILDING_COLUMN, "mean", "min", "max", "sum"])
        .map_err(|e| write_err(path, e))?;

    for (building, stats) in summary {
        writer
            .write_record([
                building.clone(),
                stats.mean.to_string(),
                stats.min.to_string(),
                stats.max.to_string(),
                stats.sum.to_string(),
            ])
            .map_err(|e| write_err(path, e))?;
    }

    writer.flush().map_err(|source| EnergyError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the three-line highlights file.
pub fn write_summary(path: &Path, highlights: &Highlights, tz: &TimezoneHandler) -> Result<()> {
    let write = || -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(highlights.render(tz).as_bytes())?;
        file.flush()
    };
    write().map_err(|source| EnergyError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn csv_writer(path: &Path) -> Result<csv::Writer<File>> {
    let file = File::create(path).map_err(|source| EnergyError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::Writer::from_writer(file))
}

fn write_err(path: &Path, e: csv::Error) -> EnergyError {
    EnergyError::OutputWrite {
        path: path.to_path_buf(),
        source: e.into(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
