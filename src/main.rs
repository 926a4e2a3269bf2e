mod cli;
mod logging;
mod reporter;

use std::path::Path;
use std::process;

use anyhow::Context;
use book_sieve::archive::report::{category_counts, format_count};
use book_sieve::{AppConfig, Outcome, SieveEngine};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use colored::*;
use dotenv::dotenv;
use reporter::CliReporter;
use tracing::{error, info};

fn main() {
    dotenv().ok();

    let args = Cli::parse();

    let _guard = logging::init_logger(args.verbose);

    let config = match book_sieve::config::load_configuration(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let result = match args.command {
        Some(Commands::Process { dry_run }) => run_process(config, dry_run),
        Some(Commands::Inspect { file }) => run_inspect(config, &file),
        Some(Commands::Search { query }) => run_search(config, &query),
        Some(Commands::PrintConfig) => print_config(&config),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run_process(config: AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let engine = SieveEngine::new(config)?;
    let reporter = CliReporter::new();
    let result = engine
        .process(&reporter, dry_run)
        .context("Run aborted")?;

    println!();
    info!(
        "Scan: {}, Gate: {}, Write: {}",
        format!("{:.2}s", result.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.gate_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.write_duration.as_secs_f64()).green(),
    );
    info!(
        "{} files, {} kept, {} removed ({} duplicates)",
        result.stats.total,
        format!("{}", result.stats.kept).green(),
        format!("{}", result.stats.removed).red(),
        format!("{}", result.stats.duplicates).red(),
    );
    for (category, count) in category_counts(&result.books) {
        info!("  {}: {}", category.label().cyan(), count);
    }

    match &result.reports {
        Some(reports) => {
            info!(
                "{} of {} rejected files moved to waste",
                result.waste_moved,
                result.rejected.len()
            );
            info!("Reports written:");
            info!("  {}", reports.deletion_report.display());
            info!("  {}", reports.catalog.display());
            info!("  {}", reports.metadata.display());
            info!("  {}", reports.rejections_csv.display());
        }
        None => info!("{}", "Dry run: no files were written or moved".yellow()),
    }

    Ok(())
}

fn run_inspect(config: AppConfig, file: &Path) -> anyhow::Result<()> {
    let engine = SieveEngine::new(config)?;
    match engine.inspect(file) {
        Outcome::Accepted(book) => println!(
            "{} {}\n  title:    {}\n  category: {}\n  length:   {} chars\n  chapters: {}",
            "KEEP".green().bold(),
            book.filename,
            book.title,
            book.category,
            book.length,
            book.chapter_count
        ),
        Outcome::Rejected(record) => println!(
            "{} {}\n  reason:   {} ({})",
            "REJECT".red().bold(),
            record.filename,
            record.reason,
            record.reason.code()
        ),
    }
    Ok(())
}

fn run_search(config: AppConfig, query: &str) -> anyhow::Result<()> {
    let engine = SieveEngine::new(config)?;
    let hits = engine
        .search(query)
        .context("Cannot search the library, has `process` been run?")?;

    if hits.is_empty() {
        println!("{}", "No matching titles".yellow());
        return Ok(());
    }
    for hit in &hits {
        println!(
            "{} [{}] {} chars, {} chapters\n  {}",
            hit.entry.title.bold(),
            hit.category.cyan(),
            format_count(hit.entry.length),
            hit.entry.chapters,
            hit.entry.archive_path
        );
    }
    info!("{} matches", hits.len());
    Ok(())
}

fn print_config(config: &AppConfig) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(config).context("Cannot render configuration")?;
    println!("{}", rendered);
    Ok(())
}
