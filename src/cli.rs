use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "book-sieve")]
#[command(about = "Filter, dedupe and shelve a pile of markdown novels", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./Config.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full pipeline on the configured source directory
    Process {
        /// Classify only: write no books, move no files, skip reports
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the verdict for a single file
    Inspect {
        /// Path to the document
        file: PathBuf,
    },
    /// Search archived titles in the last run's metadata
    Search {
        /// Case-insensitive substring of the title
        query: String,
    },
    /// Print configuration values
    PrintConfig,
}
