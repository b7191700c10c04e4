//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "fingerprint": "abc123...",
//!       "size": 7340032,
//!       "name": "movie.mkv",
//!       "files": ["/data/a/movie.mkv", "/data/b/movie.mkv"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "duplicate_sets": 1,
//!     "duplicate_files": 1,
//!     "redundant_bytes": 7340032,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   }
//! }
//! ```
//!
//! Paths are written as stored; replayed paths may no longer exist.

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateSet, DuplicateSets, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate set in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateSet {
    /// Fingerprint as hexadecimal string (64 characters)
    pub fingerprint: String,
    /// File size in bytes
    pub size: u64,
    /// Shared base name
    pub name: String,
    /// Member paths
    pub files: Vec<String>,
}

impl From<DuplicateSet<'_>> for JsonDuplicateSet {
    fn from(set: DuplicateSet<'_>) -> Self {
        Self {
            fingerprint: set.key.fingerprint_hex(),
            size: set.key.size,
            name: set.key.name.to_string_lossy().into_owned(),
            files: set
                .paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files at or above the size threshold
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Candidate keys shared by two or more files
    pub candidate_groups: usize,
    /// Files whose prefix was read
    pub fingerprinted_files: usize,
    /// Number of confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Copies beyond the first
    pub duplicate_files: usize,
    /// Bytes held by redundant copies
    pub redundant_bytes: u64,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Number of non-fatal errors
    pub error_count: usize,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            candidate_groups: summary.candidate_groups,
            fingerprinted_files: summary.fingerprinted_files,
            duplicate_sets: summary.duplicate_sets,
            duplicate_files: summary.duplicate_files,
            redundant_bytes: summary.redundant_bytes,
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            error_count: summary.scan_errors.len(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// List of duplicate sets
    pub duplicates: Vec<JsonDuplicateSet>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from duplicate sets, summary and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use dupescan::duplicates::{DuplicateKey, DuplicateSets, ScanSummary};
    /// use dupescan::error::ExitCode;
    /// use dupescan::output::json::JsonOutput;
    /// use std::path::PathBuf;
    ///
    /// let mut sets = DuplicateSets::new();
    /// sets.insert(
    ///     DuplicateKey::new([0u8; 32], 1024, "file.txt"),
    ///     vec![PathBuf::from("/a/file.txt"), PathBuf::from("/b/file.txt")],
    /// );
    ///
    /// let output = JsonOutput::new(&sets, &ScanSummary::default(), ExitCode::Success);
    /// assert_eq!(output.duplicates.len(), 1);
    /// ```
    #[must_use]
    pub fn new(sets: &DuplicateSets, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: sets.iter().map(JsonDuplicateSet::from).collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
