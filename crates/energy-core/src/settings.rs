use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Campus energy reporting, library inventory and calorie tracking
#[derive(Parser, Debug, Clone)]
#[command(
    name = "campus-energy",
    about = "Campus energy reporting, library inventory and calorie tracking",
    version
)]
pub struct Settings {
    /// Logging level
    #[arg(long, global = true, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Tool to run (defaults to the energy report)
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the campus energy report from a directory of CSV files
    Energy(EnergyArgs),
    /// Manage the library book inventory
    Library(LibraryArgs),
    /// Summarise a day's meals against a calorie limit
    Calories(CalorieArgs),
}

// ── Energy ─────────────────────────────────────────────────────────────────────

#[derive(Args, Debug, Clone, PartialEq)]
pub struct EnergyArgs {
    /// Directory holding one CSV file per building
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory the report files are written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// IANA timezone used for day, week and hour buckets
    #[arg(long, default_value = "UTC")]
    pub timezone: String,

    /// Skip rendering dashboard.png
    #[arg(long)]
    pub no_dashboard: bool,
}

impl Default for EnergyArgs {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("."),
            timezone: "UTC".to_string(),
            no_dashboard: false,
        }
    }
}

// ── Library ────────────────────────────────────────────────────────────────────

#[derive(Args, Debug, Clone)]
pub struct LibraryArgs {
    /// Inventory file (JSON)
    #[arg(long, default_value = "inventory.json")]
    pub file: PathBuf,

    #[command(subcommand)]
    pub action: LibraryAction,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum LibraryAction {
    /// Add a new book
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        isbn: String,
    },
    /// Mark an available book as issued
    Issue { isbn: String },
    /// Mark an issued book as available again
    Return { isbn: String },
    /// List every book
    List,
    /// Case-insensitive title search
    Search { title: String },
}

// ── Calories ───────────────────────────────────────────────────────────────────

#[derive(Args, Debug, Clone)]
pub struct CalorieArgs {
    /// Meal as NAME=KCAL, repeatable
    #[arg(long = "meal", required = true)]
    pub meals: Vec<String>,

    /// Daily calorie limit
    #[arg(long, default_value = "3000")]
    pub limit: f64,

    /// Append the report to this file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Date label written at the top of a saved report
    #[arg(long, requires = "save")]
    pub date: Option<String>,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse settings from the process arguments.
    pub fn load() -> Self {
        Settings::parse()
    }

    /// The command to run; a bare invocation runs the energy report with
    /// its default paths.
    pub fn selected_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Energy(EnergyArgs::default()))
    }

    /// Log level after applying `--debug`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
