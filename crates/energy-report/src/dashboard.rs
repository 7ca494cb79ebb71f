//! Three-panel dashboard image.
//!
//! Top: daily campus totals as a line. Middle: each building's mean weekly
//! total as a bar, left to right in ascending building id, one palette
//! colour per building. Bottom: hourly campus totals as a scatter.
//!
//! Panels carry no titles, tick labels or building names, so rendering never
//! depends on system fonts. The numbers behind every panel are in
//! `building_summary.csv` and `cleaned_energy_data.csv`.

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use chrono::Datelike;
use energy_core::{EnergyError, Result};
use energy_data::aggregator::{DailyTotals, HourlyTotals};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use tracing::debug;

pub const DASHBOARD_WIDTH: u32 = 1000;
pub const DASHBOARD_HEIGHT: u32 = 1200;

const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);
/// Bar colours, assigned per building in ascending id order and cycled.
const BAR_PALETTE: [RGBColor; 6] = [
    RGBColor(255, 127, 14),
    RGBColor(148, 103, 189),
    RGBColor(214, 39, 40),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(23, 190, 207),
];
const POINT_COLOR: RGBColor = RGBColor(44, 160, 44);
const AXIS_COLOR: RGBColor = RGBColor(120, 120, 120);

/// Render the dashboard to a PNG at `path`.
pub fn render_dashboard(
    path: &Path,
    daily: &DailyTotals,
    mean_weekly: &BTreeMap<String, f64>,
    hourly: &HourlyTotals,
) -> Result<()> {
    let root = BitMapBackend::new(path, (DASHBOARD_WIDTH, DASHBOARD_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let panels = root.split_evenly((3, 1));

    let daily_points: Vec<(f64, f64)> = daily
        .iter()
        .map(|p| (f64::from(p.period_key.num_days_from_ce()), p.stats.kwh))
        .collect();
    draw_line_panel(&panels[0], &daily_points)?;

    let bars: Vec<f64> = mean_weekly.values().copied().collect();
    draw_bar_panel(&panels[1], &bars)?;

    let hourly_points: Vec<(f64, f64)> = hourly
        .iter()
        .map(|p| (p.period_key.and_utc().timestamp() as f64 / 3600.0, p.stats.kwh))
        .collect();
    draw_scatter_panel(&panels[2], &hourly_points)?;

    root.present().map_err(chart_err)?;
    debug!(
        "Dashboard written to {} ({} days, {} buildings, {} hours)",
        path.display(),
        daily_points.len(),
        bars.len(),
        hourly_points.len()
    );
    Ok(())
}

// ── Panels ────────────────────────────────────────────────────────────────────

type Panel<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;

fn draw_line_panel(area: &Panel<'_>, points: &[(f64, f64)]) -> Result<()> {
    let (x_range, y_range) = fit_ranges(points);
    let mut chart = ChartBuilder::on(area)
        .margin(25)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(chart_err)?;

    draw_axes(&mut chart, &x_range, &y_range)?;
    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            LINE_COLOR.stroke_width(2),
        ))
        .map_err(chart_err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, LINE_COLOR.filled())),
        )
        .map_err(chart_err)?;
    Ok(())
}

fn draw_bar_panel(area: &Panel<'_>, values: &[f64]) -> Result<()> {
    let x_range = 0.0..(values.len().max(1) as f64);
    let y_max = values.iter().copied().fold(0.0_f64, f64::max);
    let y_range = 0.0..pad_upper(y_max);

    let mut chart = ChartBuilder::on(area)
        .margin(25)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(chart_err)?;

    draw_axes(&mut chart, &x_range, &y_range)?;
    chart
        .draw_series(values.iter().enumerate().map(|(i, &v)| {
            let left = i as f64 + 0.15;
            let right = i as f64 + 0.85;
            Rectangle::new([(left, 0.0), (right, v)], bar_color(i).filled())
        }))
        .map_err(chart_err)?;
    Ok(())
}

fn draw_scatter_panel(area: &Panel<'_>, points: &[(f64, f64)]) -> Result<()> {
    let (x_range, y_range) = fit_ranges(points);
    let mut chart = ChartBuilder::on(area)
        .margin(25)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(chart_err)?;

    draw_axes(&mut chart, &x_range, &y_range)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 2, POINT_COLOR.filled())),
        )
        .map_err(chart_err)?;
    Ok(())
}

type PanelChart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn draw_axes(
    chart: &mut PanelChart<'_, '_>,
    x_range: &Range<f64>,
    y_range: &Range<f64>,
) -> Result<()> {
    let origin = (x_range.start, y_range.start);
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![origin, (x_range.end, y_range.start)],
            AXIS_COLOR,
        )))
        .map_err(chart_err)?;
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![origin, (x_range.start, y_range.end)],
            AXIS_COLOR,
        )))
        .map_err(chart_err)?;
    Ok(())
}

// ── Ranges ────────────────────────────────────────────────────────────────────

/// Axis ranges covering every point, widened when the data is degenerate.
pub(crate) fn fit_ranges(points: &[(f64, f64)]) -> (Range<f64>, Range<f64>) {
    let (x_min, x_max, y_max) = points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0_f64),
        |(lo, hi, top), &(x, y)| (lo.min(x), hi.max(x), top.max(y)),
    );

    let x_range = if x_min.is_finite() && x_max > x_min {
        let pad = (x_max - x_min) * 0.02;
        (x_min - pad)..(x_max + pad)
    } else if x_min.is_finite() {
        (x_min - 1.0)..(x_min + 1.0)
    } else {
        0.0..1.0
    };

    (x_range, 0.0..pad_upper(y_max))
}

fn pad_upper(max: f64) -> f64 {
    if max > 0.0 {
        max * 1.05
    } else {
        1.0
    }
}

fn bar_color(index: usize) -> RGBColor {
    BAR_PALETTE[index % BAR_PALETTE.len()]
}

fn chart_err<E: std::fmt::Display>(e: E) -> EnergyError {
    EnergyError::Chart(e.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
