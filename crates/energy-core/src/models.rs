use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the column holding the reading instant.
pub const TIMESTAMP_COLUMN: &str = "timestamp";
/// Name of the column holding the energy value in kWh.
pub const KWH_COLUMN: &str = "kwh";
/// Name of the column added to every row with the source building id.
pub const BUILDING_COLUMN: &str = "building";

/// A single meter reading taken from one row of a building's CSV file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterReading {
    /// UTC instant the reading was taken.
    pub timestamp: DateTime<Utc>,
    /// Energy consumed, in kWh.
    pub kwh: f64,
    /// Identifier of the building, derived from the source file stem.
    pub building: String,
    /// Any other columns present in the source row, keyed by header.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl MeterReading {
    pub fn new(timestamp: DateTime<Utc>, kwh: f64, building: impl Into<String>) -> Self {
        Self {
            timestamp,
            kwh,
            building: building.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Attach pass-through columns to the reading.
    pub fn with_extra(mut self, extra: BTreeMap<String, String>) -> Self {
        self.extra = extra;
        self
    }
}

/// Every reading from every successfully ingested file, in encounter order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// The readings, file by file, row by row.
    pub readings: Vec<MeterReading>,
    /// Pass-through column names, union over all files in first-seen order.
    pub extra_columns: Vec<String>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one file's readings, registering any new pass-through columns.
    pub fn extend(&mut self, readings: Vec<MeterReading>, columns: &[String]) {
        for column in columns {
            if !self.extra_columns.contains(column) {
                self.extra_columns.push(column.clone());
            }
        }
        self.readings.extend(readings);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MeterReading> {
        self.readings.iter()
    }

    /// Sum of every reading's kWh value.
    pub fn total_kwh(&self) -> f64 {
        self.readings.iter().map(|r| r.kwh).sum()
    }

    /// The first reading holding the maximum kWh value.
    ///
    /// Later readings only win when strictly greater, so ties keep the
    /// earliest occurrence in dataset order.
    pub fn peak_reading(&self) -> Option<&MeterReading> {
        self.readings.iter().fold(None, |best, r| match best {
            Some(b) if r.kwh <= b.kwh => Some(b),
            _ => Some(r),
        })
    }
}

impl From<Vec<MeterReading>> for Dataset {
    fn from(readings: Vec<MeterReading>) -> Self {
        Self {
            readings,
            extra_columns: Vec::new(),
        }
    }
}

/// Descriptive statistics of one building's readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub count: usize,
}

impl BuildingStats {
    /// Fold a non-empty sequence of kWh values into stats.
    ///
    /// Returns `None` when the sequence is empty.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (count, sum, min, max) = values.into_iter().fold(
            (0usize, 0.0_f64, f64::INFINITY, f64::NEG_INFINITY),
            |(n, s, lo, hi), v| (n + 1, s + v, lo.min(v), hi.max(v)),
        );
        if count == 0 {
            return None;
        }
        Some(Self {
            mean: sum / count as f64,
            min,
            max,
            sum,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reading(hour: u32, kwh: f64, building: &str) -> MeterReading {
        MeterReading::new(
            Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
            kwh,
            building,
        )
    }

    #[test]
    fn test_dataset_extend_tracks_new_columns_once() {
        let mut ds = Dataset::new();
        ds.extend(vec![reading(0, 1.0, "A")], &["meter_id".to_string()]);
        ds.extend(
            vec![reading(1, 2.0, "B")],
            &["meter_id".to_string(), "floor".to_string()],
        );
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.extra_columns, vec!["meter_id", "floor"]);
    }

    #[test]
    fn test_total_kwh() {
        let ds = Dataset::from(vec![reading(0, 10.0, "A"), reading(6, 3.0, "B")]);
        assert!((ds.total_kwh() - 13.0).abs() < 1e-9);
        assert_eq!(Dataset::new().total_kwh(), 0.0);
    }

    #[test]
    fn test_peak_reading_keeps_first_on_tie() {
        let ds = Dataset::from(vec![
            reading(0, 4.0, "A"),
            reading(1, 9.0, "B"),
            reading(2, 9.0, "C"),
        ]);
        let peak = ds.peak_reading().unwrap();
        assert_eq!(peak.building, "B");
        assert!(Dataset::new().peak_reading().is_none());
    }

    #[test]
    fn test_building_stats_from_values() {
        let stats = BuildingStats::from_values([10.0, 5.0]).unwrap();
        assert_eq!(stats.count, 2);
        assert!((stats.mean - 7.5).abs() < 1e-9);
        assert_eq!(stats.min, 5.0);
        assert_eq!(stats.max, 10.0);
        assert_eq!(stats.sum, 15.0);
    }

    #[test]
    fn test_building_stats_empty_is_none() {
        assert!(BuildingStats::from_values(std::iter::empty()).is_none());
    }
}
