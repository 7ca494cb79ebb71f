//! Object model of the campus: buildings owning their meter readings.
//!
//! Recomputes the campus total independently of [`crate::aggregator`] so the
//! two paths can be checked against each other.

use std::collections::BTreeMap;

use energy_core::models::MeterReading;

/// One building and every reading attributed to it, in arrival order.
#[derive(Debug, Clone)]
pub struct Building {
    name: String,
    meter_readings: Vec<MeterReading>,
}

impl Building {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meter_readings: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_reading(&mut self, reading: MeterReading) {
        self.meter_readings.push(reading);
    }

    pub fn readings(&self) -> &[MeterReading] {
        &self.meter_readings
    }

    /// Sum of this building's readings, recomputed on every call.
    pub fn total_consumption(&self) -> f64 {
        self.meter_readings.iter().map(|r| r.kwh).sum()
    }
}

/// Registry of buildings, created lazily the first time a name is seen.
#[derive(Debug, Clone, Default)]
pub struct BuildingManager {
    buildings: BTreeMap<String, Building>,
}

impl BuildingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The building called `name`, creating it if this is the first reference.
    pub fn get_or_create(&mut self, name: &str) -> &mut Building {
        self.buildings
            .entry(name.to_string())
            .or_insert_with(|| Building::new(name))
    }

    /// Route every reading, in order, to its building.
    pub fn load_readings<'a>(&mut self, readings: impl IntoIterator<Item = &'a MeterReading>) {
        for reading in readings {
            self.get_or_create(&reading.building)
                .add_reading(reading.clone());
        }
    }

    /// Build a manager populated from `readings`.
    pub fn from_readings<'a>(readings: impl IntoIterator<Item = &'a MeterReading>) -> Self {
        let mut manager = Self::new();
        manager.load_readings(readings);
        manager
    }

    pub fn get(&self, name: &str) -> Option<&Building> {
        self.buildings.get(name)
    }

    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Sum of every building's own total.
    pub fn total_campus_consumption(&self) -> f64 {
        self.buildings
            .values()
            .map(Building::total_consumption)
            .sum()
    }
}
