//! Candidate collection (first pass).
//!
//! Walks the tree once and groups every regular file at or above the size
//! threshold by [`CandidateKey`](super::CandidateKey). No file content is
//! read here.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::progress::{ProgressCallback, PHASE_COLLECTING};
use crate::scanner::{ScanError, Walker, WalkerConfig};

use super::{CandidateGroups, FinderError, GroupingStats};

/// Configuration for the collection pass.
#[derive(Clone, Default)]
pub struct CollectorConfig {
    /// Minimum file size in bytes (inclusive).
    pub min_size: u64,
    /// Fail on the first traversal error instead of recording it.
    pub strict: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for CollectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorConfig")
            .field("min_size", &self.min_size)
            .field("strict", &self.strict)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl CollectorConfig {
    /// Set the minimum file size in bytes.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set fail-fast on traversal errors.
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
}

/// Statistics and diagnostics from the collection pass.
#[derive(Debug, Clone, Default)]
pub struct CollectStats {
    /// Grouping statistics
    pub grouping: GroupingStats,
    /// Total bytes of all collected files
    pub total_size: u64,
    /// Non-fatal traversal and stat errors
    pub errors: Vec<ScanError>,
}

/// Check that `root` exists and is a directory.
///
/// # Errors
///
/// [`FinderError::PathNotFound`] or [`FinderError::NotADirectory`]; these are
/// the only fatal conditions of a scan.
pub fn validate_root(root: &Path) -> Result<(), FinderError> {
    let metadata = std::fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FinderError::PathNotFound(root.to_path_buf()),
        _ => FinderError::IoWithPath {
            path: root.to_path_buf(),
            source: e,
        },
    })?;
    if !metadata.is_dir() {
        return Err(FinderError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Collect candidate groups under `root`.
///
/// # Errors
///
/// Fails when the root is missing or not a directory, when the scan is
/// interrupted, or (in strict mode) on the first traversal error.
///
/// # Example
///
/// ```no_run
/// use dupescan::duplicates::{collect_candidates, CollectorConfig};
/// use std::path::Path;
///
/// let config = CollectorConfig::default().with_min_size(5 * 1024 * 1024);
/// let (groups, stats) = collect_candidates(Path::new("."), &config).unwrap();
/// println!("{} candidate groups", stats.grouping.candidate_groups);
/// # let _ = groups;
/// ```
pub fn collect_candidates(
    root: &Path,
    config: &CollectorConfig,
) -> Result<(CandidateGroups, CollectStats), FinderError> {
    validate_root(root)?;

    if config.is_shutdown_requested() {
        return Err(FinderError::Interrupted);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_COLLECTING, 0);
        callback.on_message(&format!("Collecting {}", root.display()));
    }

    let mut walker = Walker::new(root, WalkerConfig::new(config.min_size));
    if let Some(ref flag) = config.shutdown_flag {
        walker = walker.with_shutdown_flag(flag.clone());
    }
    if let Some(ref callback) = config.progress_callback {
        walker = walker.with_progress_callback(callback.clone());
    }

    let mut groups = CandidateGroups::new();
    let mut stats = CollectStats::default();

    for result in walker.walk() {
        match result {
            Ok(file) => {
                stats.total_size = stats.total_size.saturating_add(file.size);
                groups.insert(file);
            }
            Err(e) => {
                if config.strict {
                    return Err(FinderError::ScanError(e));
                }
                stats.errors.push(e);
            }
        }
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_COLLECTING);
    }

    // The walker ends early on shutdown; whatever it gathered is incomplete.
    if config.is_shutdown_requested() {
        log::info!("Collection interrupted by shutdown signal");
        return Err(FinderError::Interrupted);
    }

    stats.grouping = groups.stats();

    log::info!(
        "Collection complete: {} files ({}) → {} candidate groups, {} potential duplicates ({:.1}% eliminated)",
        stats.grouping.total_files,
        bytesize::ByteSize::b(stats.total_size),
        stats.grouping.candidate_groups,
        stats.grouping.potential_duplicates,
        stats.grouping.elimination_rate()
    );
    if !stats.errors.is_empty() {
        log::warn!(
            "{} path(s) could not be read during collection",
            stats.errors.len()
        );
    }

    Ok((groups, stats))
}
