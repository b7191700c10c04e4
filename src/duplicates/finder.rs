//! Duplicate finder orchestrating the two-pass pipeline.
//!
//! # Overview
//!
//! 1. **Collect**: walk the tree and group files by (size, base name), see
//!    [`crate::duplicates::collector`]
//! 2. **Confirm**: fingerprint the first 1000 bytes of every file sharing a
//!    candidate key and split by fingerprint, see
//!    [`crate::duplicates::confirmer`]
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let config = FinderConfig::default().with_min_size_mb(5).with_io_threads(4);
//! let finder = DuplicateFinder::new(config);
//!
//! let (sets, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
//!
//! println!("Found {} duplicate sets", summary.duplicate_sets);
//! println!("Redundant storage: {}", summary.redundant_display());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::progress::ProgressCallback;
use crate::scanner::{megabytes_to_bytes, FileEntry, Hasher, ScanError};

use super::collector::{collect_candidates, CollectorConfig};
use super::confirmer::{confirm, ConfirmConfig, DEFAULT_IO_THREADS};
use super::{CandidateGroups, DuplicateSets};

/// Default minimum file size in megabytes.
pub const DEFAULT_MIN_SIZE_MB: u64 = 5;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Minimum file size in bytes (inclusive).
    pub min_size: u64,
    /// Number of I/O threads for fingerprinting.
    pub io_threads: usize,
    /// Abort on the first per-file error.
    pub strict: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("min_size", &self.min_size)
            .field("io_threads", &self.io_threads)
            .field("strict", &self.strict)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            min_size: megabytes_to_bytes(DEFAULT_MIN_SIZE_MB),
            io_threads: DEFAULT_IO_THREADS,
            strict: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the minimum file size in bytes.
    #[must_use]
    pub fn with_min_size(mut self, bytes: u64) -> Self {
        self.min_size = bytes;
        self
    }

    /// Set the minimum file size in megabytes (`mb * 1024 * 1024`).
    #[must_use]
    pub fn with_min_size_mb(mut self, mb: u64) -> Self {
        self.min_size = megabytes_to_bytes(mb);
        self
    }

    /// Set the I/O thread count (at least one).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Enable or disable strict mode.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            min_size: self.min_size,
            strict: self.strict,
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }

    fn confirm_config(&self) -> ConfirmConfig {
        ConfirmConfig {
            io_threads: self.io_threads.max(1),
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Summary statistics from a completed scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Files at or above the size threshold
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Candidate keys shared by two or more files
    pub candidate_groups: usize,
    /// Files eliminated because their candidate key was unique
    pub eliminated_by_key: usize,
    /// Files whose prefix was read
    pub fingerprinted_files: usize,
    /// Files eliminated because no sibling shared their fingerprint
    pub eliminated_by_fingerprint: usize,
    /// Number of confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Copies beyond the first, summed over sets
    pub duplicate_files: usize,
    /// Bytes held by redundant copies
    pub redundant_bytes: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Non-fatal errors encountered during the scan
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Redundant bytes in the unit the text report uses (MiB).
    #[must_use]
    pub fn redundant_megabytes(&self) -> f64 {
        self.redundant_bytes as f64 / (1024.0 * 1024.0)
    }

    /// Redundant bytes as a human-readable string.
    #[must_use]
    pub fn redundant_display(&self) -> String {
        bytesize::ByteSize::b(self.redundant_bytes).to_string()
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }

    /// Whether any per-file error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }
}

/// Errors that end a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root could not be inspected.
    #[error("I/O error for {path}: {source}")]
    IoWithPath {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A per-file error in strict mode.
    #[error(transparent)]
    ScanError(#[from] ScanError),
}

/// Runs collection and confirmation for one root.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files under `path`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - The scan is interrupted by shutdown signal (partial results are
    ///   discarded)
    /// - Strict mode is on and any file could not be read
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupescan::duplicates::DuplicateFinder;
    /// use std::path::Path;
    ///
    /// let finder = DuplicateFinder::with_defaults();
    /// match finder.find_duplicates(Path::new(".")) {
    ///     Ok((sets, summary)) => {
    ///         println!("Found {} duplicate sets", sets.len());
    ///         println!("{} bytes are redundant", summary.redundant_bytes);
    ///     }
    ///     Err(e) => eprintln!("Scan failed: {}", e),
    /// }
    /// ```
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(DuplicateSets, ScanSummary), FinderError> {
        let start_time = Instant::now();

        log::info!(
            "Scanning {} (min size {})",
            path.display(),
            bytesize::ByteSize::b(self.config.min_size)
        );

        let (groups, collect_stats) = collect_candidates(path, &self.config.collector_config())?;

        let mut summary = ScanSummary {
            total_files: collect_stats.grouping.total_files,
            total_size: collect_stats.total_size,
            candidate_groups: collect_stats.grouping.candidate_groups,
            eliminated_by_key: collect_stats.grouping.eliminated_unique,
            scan_errors: collect_stats.errors,
            ..Default::default()
        };

        let sets = self.confirm_groups(groups, &mut summary)?;

        summary.scan_duration = start_time.elapsed();
        log::info!(
            "Scan complete in {:.2?}: {} duplicate sets, {} redundant",
            summary.scan_duration,
            summary.duplicate_sets,
            summary.redundant_display()
        );

        Ok((sets, summary))
    }

    /// Run confirmation on an already collected file list.
    ///
    /// Skips the directory walk; useful when the caller has its own file
    /// source.
    ///
    /// # Errors
    ///
    /// Interrupted, or a strict-mode read failure.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileEntry>,
    ) -> Result<(DuplicateSets, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let groups: CandidateGroups = files
            .into_iter()
            .filter(|f| f.size >= self.config.min_size)
            .collect();
        let grouping = groups.stats();
        let mut summary = ScanSummary {
            total_files: grouping.total_files,
            candidate_groups: grouping.candidate_groups,
            eliminated_by_key: grouping.eliminated_unique,
            ..Default::default()
        };
        summary.total_size = groups
            .iter()
            .map(|(key, paths)| key.size.saturating_mul(paths.len() as u64))
            .fold(0u64, u64::saturating_add);

        let sets = self.confirm_groups(groups, &mut summary)?;
        summary.scan_duration = start_time.elapsed();
        Ok((sets, summary))
    }

    fn confirm_groups(
        &self,
        groups: CandidateGroups,
        summary: &mut ScanSummary,
    ) -> Result<DuplicateSets, FinderError> {
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (sets, stats) = confirm(groups, self.hasher.clone(), &self.config.confirm_config());

        if stats.interrupted {
            return Err(FinderError::Interrupted);
        }

        if self.config.strict {
            if let Some(e) = stats.errors.first() {
                return Err(FinderError::ScanError(ScanError::HashError(e.clone())));
            }
        }

        summary.fingerprinted_files = stats.hashed_files;
        summary.eliminated_by_fingerprint = stats.unique_fingerprints;
        summary
            .scan_errors
            .extend(stats.errors.into_iter().map(ScanError::HashError));
        summary.duplicate_sets = sets.len();
        summary.duplicate_files = sets.duplicate_files();
        summary.redundant_bytes = sets.redundant_bytes();

        Ok(sets)
    }
}
