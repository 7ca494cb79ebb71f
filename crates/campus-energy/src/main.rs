mod bootstrap;

use anyhow::{Context, Result};
use campus_tools::calories::CalorieReport;
use campus_tools::inventory::LibraryInventory;
use energy_core::formatting::format_kwh;
use energy_core::settings::{CalorieArgs, Command, EnergyArgs, LibraryAction, LibraryArgs, Settings};
use energy_core::time_utils::TimezoneHandler;
use energy_data::analysis::{analyze_energy, AnalysisOutcome};
use energy_report::write_report;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(settings.effective_log_level())?;

    tracing::debug!("campus-energy v{} starting", env!("CARGO_PKG_VERSION"));

    match settings.selected_command() {
        Command::Energy(args) => run_energy(&args),
        Command::Library(args) => run_library(&args),
        Command::Calories(args) => run_calories(&args),
    }
}

// ── Energy report ──────────────────────────────────────────────────────────────

fn run_energy(args: &EnergyArgs) -> Result<()> {
    let tz = TimezoneHandler::new(&args.timezone);
    tracing::info!(
        "Looking in: {} (timezone {})",
        args.data_dir.display(),
        tz.tz().name()
    );

    let result = match analyze_energy(&args.data_dir, tz) {
        AnalysisOutcome::NoData(report) => {
            tracing::info!(
                "{} file(s) found, {} skipped",
                report.files_found,
                report.skipped.len()
            );
            println!("No data loaded. Exiting.");
            return Ok(());
        }
        AnalysisOutcome::Complete(result) => result,
    };

    let paths = write_report(&result, &args.output_dir, &tz, !args.no_dashboard)
        .context("failed to write energy report")?;

    tracing::debug!(
        "Analysis generated at {}: load {:.3}s, aggregate {:.3}s, {} weekly buckets",
        result.metadata.generated_at,
        result.metadata.load_time_seconds,
        result.metadata.aggregate_time_seconds,
        result.weekly.len()
    );
    println!(
        "Processed {} readings from {} building(s); {} file(s) skipped",
        result.metadata.readings_processed,
        result.metadata.buildings,
        result.metadata.files_skipped
    );
    println!("Total campus consumption: {}", format_kwh(result.campus_total));
    println!("Summary written to {}", paths.summary.display());
    Ok(())
}

// ── Library inventory ──────────────────────────────────────────────────────────

fn run_library(args: &LibraryArgs) -> Result<()> {
    let mut inventory = LibraryInventory::open(&args.file)
        .with_context(|| format!("failed to open inventory {}", args.file.display()))?;

    match &args.action {
        LibraryAction::Add {
            title,
            author,
            isbn,
        } => {
            let book = inventory.add_book(title, author, isbn)?;
            println!("Book added: {}", book);
        }
        LibraryAction::Issue { isbn } => {
            inventory.issue_book(isbn)?;
            println!("Book {} issued.", isbn);
        }
        LibraryAction::Return { isbn } => {
            inventory.return_book(isbn)?;
            println!("Book {} returned.", isbn);
        }
        LibraryAction::List => {
            if inventory.books().is_empty() {
                println!("No books in inventory.");
            }
            for book in inventory.books() {
                println!("{}", book);
            }
        }
        LibraryAction::Search { title } => {
            let hits = inventory.search_by_title(title);
            if hits.is_empty() {
                println!("No books found with that title.");
            }
            for book in hits {
                println!("{}", book);
            }
        }
    }
    Ok(())
}

// ── Calorie log ────────────────────────────────────────────────────────────────

fn run_calories(args: &CalorieArgs) -> Result<()> {
    let report = CalorieReport::from_specs(args.meals.as_slice(), args.limit)?;

    print!("{}", report.render_table());
    println!("{}", report.limit_message());

    if let Some(path) = &args.save {
        report.append_to(path, args.date.as_deref())?;
        println!("Report saved to {}", path.display());
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
