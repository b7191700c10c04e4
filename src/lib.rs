//! dupescan - duplicate file finder
//!
//! Finds duplicate files under a directory by grouping on size and base name,
//! then confirming with a BLAKE3 fingerprint of each file's first 1000 bytes.
//! Results are stored per root so they can be replayed without rescanning.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;
pub mod snapshot;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use cli::{Cli, Commands, OutputFormat, ReplayArgs, RescanArgs};
use config::Config;
use duplicates::{DuplicateFinder, DuplicateSets, FinderConfig, ScanSummary};
use error::ExitCode;
use progress::Progress;
use scanner::megabytes_to_bytes;
use snapshot::{Snapshot, SnapshotStore};

/// Message printed by `replay` when no snapshot exists for the root.
pub const NO_DATA_MESSAGE: &str = "No saved data found; please run 'rescan' to generate data.";

/// Global flags shared by all subcommands.
#[derive(Debug, Clone, Copy)]
struct GlobalFlags {
    quiet: bool,
    no_color: bool,
}

/// Run the application for parsed CLI arguments.
///
/// # Errors
///
/// Fatal conditions only: bad root, interrupted scan, unreadable or corrupt
/// snapshot, output failure. A missing snapshot is not an error; it yields
/// [`ExitCode::NoData`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);
    if cli.no_color {
        yansi::disable();
    }

    let config = Config::load(cli.config.as_deref());
    log::debug!("Effective configuration: {:?}", config);

    let flags = GlobalFlags {
        quiet: cli.quiet,
        no_color: cli.no_color,
    };

    match cli.command {
        Commands::Rescan(args) => handle_rescan(args, &config, flags),
        Commands::Replay(args) => handle_replay(args, &config, flags),
    }
}

fn snapshot_store(cli_dir: Option<PathBuf>, config: &Config) -> SnapshotStore {
    SnapshotStore::resolve(cli_dir.or_else(|| config.snapshot_dir.clone()))
}

fn handle_rescan(args: RescanArgs, config: &Config, flags: GlobalFlags) -> Result<ExitCode> {
    let shutdown = signal::install_handler()?;

    let min_size = megabytes_to_bytes(args.min_size_mb.unwrap_or(config.min_size_mb));
    let io_threads = args
        .io_threads
        .map_or(config.io_threads, |n| usize::try_from(n).unwrap_or(usize::MAX));
    let strict = args.strict || config.strict;

    // Progress bars would interleave with machine-readable stdout.
    let show_progress = !flags.quiet && args.output == OutputFormat::Text;
    let progress = Arc::new(Progress::new(!show_progress));

    let finder_config = FinderConfig::default()
        .with_min_size(min_size)
        .with_io_threads(io_threads)
        .with_strict(strict)
        .with_shutdown_flag(shutdown.flag())
        .with_progress_callback(progress);
    let finder = DuplicateFinder::new(finder_config);

    let (sets, summary) = finder
        .find_duplicates(&args.root)
        .with_context(|| format!("Scan of {} failed", args.root.display()))?;

    for error in &summary.scan_errors {
        log::debug!("Skipped: {}", error);
    }

    let exit_code = scan_exit_code(&sets, &summary);

    let saved = if args.no_save {
        log::info!("Not saving results (--no-save)");
        Ok(None)
    } else {
        let store = snapshot_store(args.snapshot_dir.clone(), config);
        store
            .save(&Snapshot::new(args.root.clone(), min_size, &sets))
            .map(Some)
    };

    let mut stdout = std::io::stdout().lock();
    if let Ok(Some(ref path)) = saved {
        if args.output == OutputFormat::Text && !flags.quiet {
            use std::io::Write;
            writeln!(stdout, "Results saved to {}", path.display())
                .context("Failed to write output")?;
        } else {
            log::info!("Results saved to {}", path.display());
        }
    }

    output::write_report(
        &mut stdout,
        args.output,
        &sets,
        &summary,
        exit_code,
        use_color(flags),
    )?;

    saved.context("Failed to save snapshot")?;
    Ok(exit_code)
}

fn handle_replay(args: ReplayArgs, config: &Config, flags: GlobalFlags) -> Result<ExitCode> {
    let store = snapshot_store(args.snapshot_dir.clone(), config);
    let Some(snapshot) = store.load(&args.root)? else {
        if args.output == OutputFormat::Text {
            println!("{}", NO_DATA_MESSAGE);
        } else {
            eprintln!("{}", NO_DATA_MESSAGE);
        }
        return Ok(ExitCode::NoData);
    };

    log::info!(
        "Replaying snapshot of {} taken {} ({} sets)",
        snapshot.root.display(),
        snapshot.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        snapshot.sets.len()
    );

    let sets = snapshot.to_sets()?;
    let summary = snapshot.summary(&sets);
    let exit_code = if sets.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };

    let mut stdout = std::io::stdout().lock();
    output::write_report(
        &mut stdout,
        args.output,
        &sets,
        &summary,
        exit_code,
        use_color(flags),
    )?;
    Ok(exit_code)
}

/// Exit code for a completed scan. Per-file errors outrank the
/// no-duplicates outcome.
#[must_use]
pub fn scan_exit_code(sets: &DuplicateSets, summary: &ScanSummary) -> ExitCode {
    if summary.has_errors() {
        ExitCode::PartialSuccess
    } else if sets.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    }
}

fn use_color(flags: GlobalFlags) -> bool {
    !flags.no_color && std::io::stdout().is_terminal()
}
