//! Main analysis pipeline for the campus energy report.
//!
//! Loads every building file, aggregates the readings and cross-checks the
//! campus total through the building object model, returning everything the
//! reporting layer needs.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use energy_core::formatting::format_kwh;
use energy_core::models::{BuildingStats, Dataset};
use energy_core::time_utils::TimezoneHandler;
use tracing::{debug, info, warn};

use crate::aggregator::{DailyTotals, EnergyAggregator, HourlyTotals, WeeklyTotals};
use crate::buildings::BuildingManager;
use crate::reader::{load_dataset, IngestReport};

/// Relative tolerance for the campus-total cross-check.
const CROSS_CHECK_TOLERANCE: f64 = 1e-6;

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    pub files_found: usize,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub readings_processed: usize,
    pub buildings: usize,
    /// Wall-clock seconds spent reading the CSV files.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent aggregating.
    pub aggregate_time_seconds: f64,
}

/// The complete output of a successful [`analyze_energy`] run.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub dataset: Dataset,
    pub ingest: IngestReport,
    pub daily: DailyTotals,
    pub weekly: WeeklyTotals,
    pub hourly: HourlyTotals,
    /// Per-building mean, min, max and sum.
    pub summary: BTreeMap<String, BuildingStats>,
    /// Per-building average of weekly totals.
    pub mean_weekly: BTreeMap<String, f64>,
    /// Sum of every reading.
    pub campus_total: f64,
    /// Campus total as accumulated by [`BuildingManager`].
    pub mirror_total: f64,
    pub metadata: AnalysisMetadata,
}

/// Result of running the pipeline.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// No file yielded any readings; nothing downstream should run.
    NoData(IngestReport),
    Complete(Box<AnalysisResult>),
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full analysis pipeline.
///
/// 1. Load every building CSV under `data_path`.
/// 2. Stop with [`AnalysisOutcome::NoData`] when nothing loaded.
/// 3. Aggregate into daily, weekly and hourly totals and building stats.
/// 4. Accumulate the same readings through [`BuildingManager`].
pub fn analyze_energy(data_path: &Path, tz: TimezoneHandler) -> AnalysisOutcome {
    // ── Step 1: Load readings ─────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let (dataset, ingest) = load_dataset(data_path, &tz);
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Short-circuit on no data ──────────────────────────────────────
    if dataset.is_empty() {
        return AnalysisOutcome::NoData(ingest);
    }

    // ── Step 3: Aggregate ─────────────────────────────────────────────────────
    let aggregate_start = std::time::Instant::now();
    let aggregator = EnergyAggregator::new(tz);
    let readings = dataset.readings.as_slice();
    let daily = aggregator.aggregate_daily(readings);
    let weekly = aggregator.aggregate_weekly(readings);
    let hourly = aggregator.aggregate_hourly(readings);
    let summary = EnergyAggregator::building_summary(readings);
    let mean_weekly = aggregator.mean_weekly_by_building(readings);
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    // ── Step 4: Object-model cross-check ──────────────────────────────────────
    let manager = BuildingManager::from_readings(readings);
    let mirror_total = manager.total_campus_consumption();
    let campus_total = dataset.total_kwh();
    check_campus_totals(campus_total, mirror_total, &summary);

    info!("Total campus (building model): {}", format_kwh(mirror_total));

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        files_found: ingest.files_found,
        files_loaded: ingest.files_loaded.len(),
        files_skipped: ingest.skipped.len(),
        readings_processed: dataset.len(),
        buildings: manager.len(),
        load_time_seconds: load_time,
        aggregate_time_seconds: aggregate_time,
    };

    debug!(
        "Analysed {} readings across {} buildings ({} days, {} weeks)",
        metadata.readings_processed,
        metadata.buildings,
        daily.len(),
        weekly.len()
    );

    AnalysisOutcome::Complete(Box::new(AnalysisResult {
        dataset,
        ingest,
        daily,
        weekly,
        hourly,
        summary,
        mean_weekly,
        campus_total,
        mirror_total,
        metadata,
    }))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Whether two campus totals agree within [`CROSS_CHECK_TOLERANCE`].
pub fn totals_agree(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= CROSS_CHECK_TOLERANCE * scale
}

fn check_campus_totals(
    campus_total: f64,
    mirror_total: f64,
    summary: &BTreeMap<String, BuildingStats>,
) {
    let summary_total: f64 = summary.values().map(|s| s.sum).sum();
    if !totals_agree(mirror_total, summary_total) || !totals_agree(campus_total, summary_total) {
        warn!(
            "Campus totals disagree: readings {}, building model {}, summary {}",
            campus_total, mirror_total, summary_total
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
