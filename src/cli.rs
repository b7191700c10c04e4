//! Command-line interface definitions for dupescan.
//!
//! Global options (verbosity, color, config file) come first, then one of two
//! subcommands: `rescan` walks the tree and stores a snapshot, `replay`
//! reports the stored snapshot without touching the tree.
//!
//! # Example
//!
//! ```bash
//! # Scan for duplicates of 5 MB and more (the default threshold)
//! dupescan rescan ~/Videos
//!
//! # Lower the threshold and emit JSON
//! dupescan rescan ~/Videos --min-size-mb 1 --output json
//!
//! # Show the results of the last scan again
//! dupescan replay ~/Videos
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Duplicate file finder using size, name and content prefix.
///
/// Files are grouped by size and base name, then confirmed by a BLAKE3
/// fingerprint of their first 1000 bytes.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory tree and store the results
    Rescan(RescanArgs),
    /// Report the stored results of the last scan of a directory
    Replay(ReplayArgs),
}

/// Arguments for the rescan subcommand.
#[derive(Debug, Args)]
pub struct RescanArgs {
    /// Directory to scan
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Minimum file size in megabytes (1 MB = 1024 * 1024 bytes) [default: 5]
    #[arg(long, value_name = "N")]
    pub min_size_mb: Option<u64>,

    /// Number of I/O threads for fingerprinting [default: 4]
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub io_threads: Option<u64>,

    /// Directory holding snapshot files
    #[arg(long, value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Do not write a snapshot
    #[arg(long)]
    pub no_save: bool,

    /// Abort on the first unreadable file or directory
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the replay subcommand.
#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Directory whose stored results to show, spelled as when it was scanned
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Directory holding snapshot files
    #[arg(long, value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
