//! Daily calorie log: totals, per-meal average and a limit check.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

/// Daily limit used when none is given.
pub const DEFAULT_DAILY_LIMIT: f64 = 3000.0;

#[derive(Error, Debug)]
pub enum CalorieError {
    #[error("Invalid meal \"{0}\": expected NAME=KCAL")]
    InvalidMeal(String),

    #[error("Invalid calorie amount for {meal}: {value}")]
    InvalidAmount { meal: String, value: String },

    #[error("At least one meal is required")]
    NoMeals,

    #[error("Daily limit must be a positive number, got {0}")]
    InvalidLimit(f64),

    #[error("Failed to save report to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CalorieError>;

// ── Meal ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Meal {
    pub name: String,
    pub calories: f64,
}

impl FromStr for Meal {
    type Err = CalorieError;

    /// Parse `NAME=KCAL`. The last `=` splits, so names may contain `=`.
    fn from_str(spec: &str) -> Result<Self> {
        let (name, value) = spec
            .rsplit_once('=')
            .ok_or_else(|| CalorieError::InvalidMeal(spec.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CalorieError::InvalidMeal(spec.to_string()));
        }
        let calories = value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|c| c.is_finite() && *c >= 0.0)
            .ok_or_else(|| CalorieError::InvalidAmount {
                meal: name.to_string(),
                value: value.trim().to_string(),
            })?;
        Ok(Self {
            name: name.to_string(),
            calories,
        })
    }
}

// ── CalorieReport ─────────────────────────────────────────────────────────────

/// One day's meals and the figures derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct CalorieReport {
    meals: Vec<Meal>,
    total: f64,
    limit: f64,
}

impl CalorieReport {
    pub fn new(meals: Vec<Meal>, limit: f64) -> Result<Self> {
        if meals.is_empty() {
            return Err(CalorieError::NoMeals);
        }
        if !(limit.is_finite() && limit > 0.0) {
            return Err(CalorieError::InvalidLimit(limit));
        }
        let total = meals.iter().fold(0.0, |acc, m| acc + m.calories);
        Ok(Self {
            meals,
            total,
            limit,
        })
    }

    /// Parse every `NAME=KCAL` spec and build the report.
    pub fn from_specs<S: AsRef<str>>(specs: &[S], limit: f64) -> Result<Self> {
        let meals = specs
            .iter()
            .map(|s| s.as_ref().parse::<Meal>())
            .collect::<Result<Vec<_>>>()?;
        Self::new(meals, limit)
    }

    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Mean calories per meal, rounded to two decimals.
    pub fn average(&self) -> f64 {
        (self.total / self.meals.len() as f64 * 100.0).round() / 100.0
    }

    pub fn exceeds_limit(&self) -> bool {
        self.total > self.limit
    }

    /// Tab-separated meal table with total and average rows.
    pub fn render_table(&self) -> String {
        let mut out = String::from("Meal name\tCalories\n--------------------------\n");
        for meal in &self.meals {
            out.push_str(&format!("{}\t{}\n", meal.name, meal.calories));
        }
        out.push_str(&format!("Total calorie\t{}\n", self.total));
        out.push_str(&format!("Average calorie\t{}\n", self.average()));
        out
    }

    /// One-line verdict against the daily limit.
    pub fn limit_message(&self) -> &'static str {
        if self.exceeds_limit() {
            "Your calorie intake for today exceeded your daily limit!"
        } else {
            "Your calorie intake for today is within your daily limit."
        }
    }

    /// Append the dated table to `path`, creating the file if needed.
    pub fn append_to(&self, path: &Path, date: Option<&str>) -> Result<()> {
        let write = || -> std::io::Result<()> {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            if let Some(date) = date {
                writeln!(file, "{}", date.trim())?;
            }
            file.write_all(self.render_table().as_bytes())
        };
        write().map_err(|source| CalorieError::Save {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
