use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use calc_core::BracketTableRegistry;
use calc_core::calculations::deduction_drift;
use calc_data::BracketTableLoader;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Validate bracket tables from a CSV file and print a summary.
///
/// The CSV file should have the following columns:
/// - regime: `freelancer` or `income`
/// - tax_year: The year the table applies to (e.g., 2024)
/// - lower_bound: Inclusive lower bound of the bracket
/// - upper_bound: Exclusive upper bound (empty for unbounded)
/// - rate: The marginal rate as a decimal (e.g., 0.15)
/// - cumulative_deduction: Constant subtracted from `amount * rate`
#[derive(Parser, Debug)]
#[command(name = "calc-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing bracket table data
    #[arg(short, long)]
    file: PathBuf,

    /// Start from the built-in tables, so the file can override them
    #[arg(short, long, default_value_t = false)]
    builtin: bool,

    /// Print every bracket of every table
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let mut registry = if args.builtin {
        BracketTableRegistry::with_builtin_tables()
    } else {
        BracketTableRegistry::new()
    };

    println!("Loading bracket tables from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let records = BracketTableLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} records from CSV", records.len());

    let loaded = BracketTableLoader::load(&mut registry, &records)
        .context("Failed to validate bracket tables")?;

    println!("Validated {} bracket tables.", loaded);

    for table in registry.tables() {
        let drift = deduction_drift(table);
        println!(
            "  {} {}: {} brackets{}",
            table.regime(),
            table.year(),
            table.brackets().len(),
            if drift.is_empty() {
                String::new()
            } else {
                format!(", {} tiers with deduction drift", drift.len())
            }
        );

        if args.verbose {
            for bracket in table.brackets() {
                let upper = bracket
                    .upper_bound
                    .map_or_else(|| "∞".to_string(), |u| u.to_string());
                println!(
                    "    [{}, {})  rate {}  deduction {}",
                    bracket.lower_bound, upper, bracket.rate, bracket.cumulative_deduction
                );
            }
        }
    }

    Ok(())
}
