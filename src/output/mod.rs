//! Output formatters for duplicate scan results.
//!
//! This module provides different output formats for scan results:
//! - Text for people
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::DuplicateFinder;
//! use dupescan::error::ExitCode;
//! use dupescan::output::json::JsonOutput;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (sets, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let output = JsonOutput::new(&sets, &summary, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::io::Write;

use anyhow::{Context, Result};

use crate::cli::OutputFormat;
use crate::duplicates::{DuplicateSets, ScanSummary};
use crate::error::ExitCode;

// Re-export main types
pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::TextOutput;

/// Write `sets` in `format` to `writer`.
///
/// `colored` only affects the text report.
///
/// # Errors
///
/// Serialization or write failures.
pub fn write_report<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    sets: &DuplicateSets,
    summary: &ScanSummary,
    exit_code: ExitCode,
    colored: bool,
) -> Result<()> {
    match format {
        OutputFormat::Text => TextOutput::new(sets, colored)
            .write_to(writer)
            .context("Failed to write text report")?,
        OutputFormat::Json => JsonOutput::new(sets, summary, exit_code)
            .write_to(writer, true)
            .context("Failed to write JSON output")?,
        OutputFormat::Csv => CsvOutput::new(sets)
            .write_to(&mut *writer)
            .context("Failed to write CSV output")?,
    }
    writer.flush().context("Failed to flush output")?;
    Ok(())
}
