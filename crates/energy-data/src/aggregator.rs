//! Energy aggregation over hourly, daily and weekly buckets, plus
//! per-building descriptive statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use energy_core::models::{BuildingStats, MeterReading};
use energy_core::time_utils::TimezoneHandler;

// ── AggregatedStats ───────────────────────────────────────────────────────────

/// Energy total accumulated across a group of readings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregatedStats {
    pub kwh: f64,
    pub count: usize,
}

impl AggregatedStats {
    /// Add a single reading to the running totals.
    pub fn add_reading(&mut self, reading: &MeterReading) {
        self.kwh += reading.kwh;
        self.count += 1;
    }
}

// ── AggregatedPeriod ──────────────────────────────────────────────────────────

/// All readings within one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedPeriod<K> {
    /// Bucket key: a date for days and weeks, the hour start for hours.
    pub period_key: K,
    pub stats: AggregatedStats,
}

/// Daily totals keyed by calendar date.
pub type DailyTotals = Vec<AggregatedPeriod<NaiveDate>>;
/// Weekly totals keyed by the Sunday closing each week.
pub type WeeklyTotals = Vec<AggregatedPeriod<NaiveDate>>;
/// Hourly totals keyed by the start of each hour.
pub type HourlyTotals = Vec<AggregatedPeriod<NaiveDateTime>>;

// ── EnergyAggregator ──────────────────────────────────────────────────────────

/// Groups meter readings by time bucket or building.
///
/// Every bucket uses the same [`TimezoneHandler`], so hourly, daily and
/// weekly series always partition the same set of readings.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyAggregator {
    tz: TimezoneHandler,
}

impl EnergyAggregator {
    pub fn new(tz: TimezoneHandler) -> Self {
        Self { tz }
    }

    /// Sum readings per calendar day, ascending. Days without readings are absent.
    pub fn aggregate_daily(&self, readings: &[MeterReading]) -> DailyTotals {
        Self::aggregate_by_period(readings, |ts| self.tz.day_bucket(ts))
    }

    /// Sum readings per Monday–Sunday week, keyed by the closing Sunday.
    pub fn aggregate_weekly(&self, readings: &[MeterReading]) -> WeeklyTotals {
        Self::aggregate_by_period(readings, |ts| self.tz.week_bucket(ts))
    }

    /// Sum readings per clock hour across every building.
    pub fn aggregate_hourly(&self, readings: &[MeterReading]) -> HourlyTotals {
        Self::aggregate_by_period(readings, |ts| self.tz.hour_bucket(ts))
    }

    /// Mean, min, max and sum of kWh per building, ordered by building id.
    pub fn building_summary(readings: &[MeterReading]) -> BTreeMap<String, BuildingStats> {
        let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for reading in readings {
            grouped
                .entry(reading.building.as_str())
                .or_default()
                .push(reading.kwh);
        }

        grouped
            .into_iter()
            .filter_map(|(building, values)| {
                BuildingStats::from_values(values).map(|stats| (building.to_string(), stats))
            })
            .collect()
    }

    /// Average weekly total per building.
    ///
    /// Each building's readings are summed per week first; only weeks in
    /// which the building has readings take part in its average.
    pub fn mean_weekly_by_building(&self, readings: &[MeterReading]) -> BTreeMap<String, f64> {
        let mut weekly: BTreeMap<&str, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
        for reading in readings {
            *weekly
                .entry(reading.building.as_str())
                .or_default()
                .entry(self.tz.week_bucket(reading.timestamp))
                .or_insert(0.0) += reading.kwh;
        }

        weekly
            .into_iter()
            .map(|(building, weeks)| {
                let mean = weeks.values().sum::<f64>() / weeks.len() as f64;
                (building.to_string(), mean)
            })
            .collect()
    }

    /// Sum the stats of every period into one [`AggregatedStats`].
    pub fn calculate_totals<K>(periods: &[AggregatedPeriod<K>]) -> AggregatedStats {
        periods
            .iter()
            .fold(AggregatedStats::default(), |acc, p| AggregatedStats {
                kwh: acc.kwh + p.stats.kwh,
                count: acc.count + p.stats.count,
            })
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Generic bucketing driver; `key_fn` maps a reading's instant to its bucket.
    fn aggregate_by_period<K: Ord + Clone>(
        readings: &[MeterReading],
        key_fn: impl Fn(DateTime<Utc>) -> K,
    ) -> Vec<AggregatedPeriod<K>> {
        let mut map: BTreeMap<K, AggregatedStats> = BTreeMap::new();

        for reading in readings {
            map.entry(key_fn(reading.timestamp))
                .or_default()
                .add_reading(reading);
        }

        map.into_iter()
            .map(|(period_key, stats)| AggregatedPeriod { period_key, stats })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_reading(ts: &str, kwh: f64, building: &str) -> MeterReading {
        let timestamp = TimezoneHandler::default().parse_timestamp(ts).unwrap();
        MeterReading::new(timestamp, kwh, building)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn worked_example() -> Vec<MeterReading> {
        vec![
            make_reading("2024-01-01T00:00", 10.0, "A"),
            make_reading("2024-01-01T12:00", 5.0, "A"),
            make_reading("2024-01-01T06:00", 3.0, "B"),
        ]
    }

    // ── aggregate_daily ───────────────────────────────────────────────────────

    #[test]
    fn test_daily_worked_example() {
        let agg = EnergyAggregator::default();
        let daily = agg.aggregate_daily(&worked_example());
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].period_key, date(2024, 1, 1));
        assert!((daily[0].stats.kwh - 18.0).abs() < 1e-9);
        assert_eq!(daily[0].stats.count, 3);
    }

    #[test]
    fn test_daily_sorted_and_no_zero_fill() {
        let readings = vec![
            make_reading("2024-01-20T08:00", 1.0, "A"),
            make_reading("2024-01-10T08:00", 2.0, "A"),
            make_reading("2024-01-15T08:00", 3.0, "A"),
        ];
        let daily = EnergyAggregator::default().aggregate_daily(&readings);
        let keys: Vec<NaiveDate> = daily.iter().map(|p| p.period_key).collect();
        assert_eq!(keys, vec![date(2024, 1, 10), date(2024, 1, 15), date(2024, 1, 20)]);
    }

    #[test]
    fn test_daily_empty() {
        assert!(EnergyAggregator::default().aggregate_daily(&[]).is_empty());
    }

    #[test]
    fn test_daily_respects_timezone() {
        let agg = EnergyAggregator::new(TimezoneHandler::new("America/New_York"));
        let readings = vec![MeterReading::new(
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap(),
            4.0,
            "A",
        )];
        let daily = agg.aggregate_daily(&readings);
        assert_eq!(daily[0].period_key, date(2024, 1, 1));
    }

    // ── aggregate_weekly ──────────────────────────────────────────────────────

    #[test]
    fn test_weekly_sunday_boundary() {
        let readings = vec![
            make_reading("2024-01-01T00:00", 1.0, "A"), // Monday
            make_reading("2024-01-07T23:00", 2.0, "A"), // Sunday, same week
            make_reading("2024-01-08T00:00", 4.0, "A"), // next Monday
        ];
        let weekly = EnergyAggregator::default().aggregate_weekly(&readings);
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[0].period_key, date(2024, 1, 7));
        assert!((weekly[0].stats.kwh - 3.0).abs() < 1e-9);
        assert_eq!(weekly[1].period_key, date(2024, 1, 14));
        assert!((weekly[1].stats.kwh - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_bucket_sums_partition_total() {
        let readings = vec![
            make_reading("2024-01-01T00:00", 1.5, "A"),
            make_reading("2024-01-03T10:30", 2.25, "B"),
            make_reading("2024-01-09T23:59", 4.0, "A"),
            make_reading("2024-02-14T12:00", 7.75, "C"),
            make_reading("2024-02-14T12:45", 0.5, "C"),
        ];
        let agg = EnergyAggregator::default();
        let total: f64 = readings.iter().map(|r| r.kwh).sum();
        let daily = EnergyAggregator::calculate_totals(&agg.aggregate_daily(&readings));
        let weekly = EnergyAggregator::calculate_totals(&agg.aggregate_weekly(&readings));
        let hourly = EnergyAggregator::calculate_totals(&agg.aggregate_hourly(&readings));
        assert!((daily.kwh - total).abs() < 1e-9);
        assert!((weekly.kwh - total).abs() < 1e-9);
        assert!((hourly.kwh - total).abs() < 1e-9);
        assert_eq!(daily.count, readings.len());
        assert_eq!(weekly.count, readings.len());
    }

    // ── aggregate_hourly ──────────────────────────────────────────────────────

    #[test]
    fn test_hourly_merges_buildings() {
        let readings = vec![
            make_reading("2024-01-01T10:05", 1.0, "A"),
            make_reading("2024-01-01T10:55", 2.0, "B"),
            make_reading("2024-01-01T11:00", 4.0, "A"),
        ];
        let hourly = EnergyAggregator::default().aggregate_hourly(&readings);
        assert_eq!(hourly.len(), 2);
        assert_eq!(
            hourly[0].period_key,
            date(2024, 1, 1).and_hms_opt(10, 0, 0).unwrap()
        );
        assert!((hourly[0].stats.kwh - 3.0).abs() < 1e-9);
    }

    // ── building_summary ──────────────────────────────────────────────────────

    #[test]
    fn test_building_summary_worked_example() {
        let summary = EnergyAggregator::building_summary(&worked_example());
        assert_eq!(summary.len(), 2);

        let a = summary.get("A").unwrap();
        assert_eq!(a.sum, 15.0);
        assert_eq!(a.mean, 7.5);
        assert_eq!(a.min, 5.0);
        assert_eq!(a.max, 10.0);

        let b = summary.get("B").unwrap();
        assert_eq!((b.sum, b.mean, b.min, b.max), (3.0, 3.0, 3.0, 3.0));
    }

    // ── mean_weekly_by_building ───────────────────────────────────────────────

    #[test]
    fn test_mean_weekly_by_building() {
        let readings = vec![
            make_reading("2024-01-01T00:00", 10.0, "A"),
            make_reading("2024-01-02T00:00", 10.0, "A"),
            make_reading("2024-01-09T00:00", 40.0, "A"),
            make_reading("2024-01-09T00:00", 6.0, "B"),
        ];
        let means = EnergyAggregator::default().mean_weekly_by_building(&readings);
        // A: weeks of 20 and 40; B only has one week.
        assert!((means["A"] - 30.0).abs() < 1e-9);
        assert!((means["B"] - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_weekly_ignores_weeks_without_readings() {
        // Weeks ending Jan 7 and Jan 21 have readings; the week ending Jan 14 does not.
        let readings = vec![
            make_reading("2024-01-03T00:00", 12.0, "A"),
            make_reading("2024-01-17T00:00", 8.0, "A"),
        ];
        let means = EnergyAggregator::default().mean_weekly_by_building(&readings);
        assert!((means["A"] - 10.0).abs() < 1e-9);
    }

    // ── calculate_totals ──────────────────────────────────────────────────────

    #[test]
    fn test_calculate_totals_empty() {
        let totals = EnergyAggregator::calculate_totals::<NaiveDate>(&[]);
        assert_eq!(totals, AggregatedStats::default());
    }
}
