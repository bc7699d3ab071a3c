/// Bank Linter — validates template bank coverage and references.
///
/// Usage: bank_linter <bank.ron>... [--standalone] [--config <targets.ron>]
use anyhow::{bail, Context, Result};
use clap::Parser;
use shorts_planner::core::assembler::{builtin_bank, lint_bank};
use shorts_planner::core::template::TemplateBank;
use shorts_planner::ListTargets;
use std::path::PathBuf;
use std::process;

#[derive(Debug, Parser)]
#[command(name = "bank_linter", about = "Lint template bank RON files")]
struct Args {
    /// Bank files, merged in order.
    files: Vec<PathBuf>,
    /// Lint the files on their own instead of over the built-in bank.
    #[arg(long)]
    standalone: bool,
    /// RON file with list targets to check coverage against.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.files.is_empty() && args.standalone {
        bail!("--standalone needs at least one bank file");
    }

    let mut bank = if args.standalone {
        TemplateBank::default()
    } else {
        builtin_bank()?.clone()
    };
    for path in &args.files {
        let loaded = TemplateBank::load_from_ron(path)
            .with_context(|| format!("Failed to load bank file '{}'", path.display()))?;
        bank.merge(loaded);
    }

    let targets = match &args.config {
        Some(path) => ListTargets::load_from_ron(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => ListTargets::default(),
    };

    let entries: usize = bank.slots.values().map(|s| s.entries.len()).sum();
    println!("Loaded {} slots, {} entries", bank.slots.len(), entries);

    let report = lint_bank(&bank, &targets);

    println!("\n=== Template Bank Lint Report ===\n");
    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("All checks passed!");
    }
    for warning in &report.warnings {
        println!("WARNING: {}", warning);
    }
    for error in &report.errors {
        println!("ERROR: {}", error);
    }
    println!(
        "\nSummary: {} errors, {} warnings",
        report.errors.len(),
        report.warnings.len()
    );

    if !report.is_clean() {
        process::exit(1);
    }
    Ok(())
}
