//! Content confirmation (second pass).
//!
//! # Overview
//!
//! Candidate groups with a single member are dropped before anything is
//! read. Every remaining path is fingerprinted on a rayon pool bounded by
//! `io_threads`, and each candidate group is then split by fingerprint.
//! Splits with two or more members become [`DuplicateSets`] entries.
//!
//! The parallel step only produces `(group, path, result)` triples. The
//! result map is built afterwards by a single owner.
//!
//! # Example
//!
//! ```no_run
//! use dupescan::duplicates::{collect_candidates, confirm, CollectorConfig, ConfirmConfig};
//! use dupescan::scanner::Hasher;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let (groups, _) = collect_candidates(Path::new("."), &CollectorConfig::default()).unwrap();
//! let (sets, stats) = confirm(groups, Arc::new(Hasher::new()), &ConfirmConfig::default());
//! println!("{} sets from {} fingerprinted files", sets.len(), stats.hashed_files);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::progress::{ProgressCallback, PHASE_FINGERPRINTING};
use crate::scanner::{Fingerprint, HashError, Hasher};

use super::{CandidateGroups, CandidateKey, DuplicateKey, DuplicateSets};

/// Default number of fingerprinting threads.
pub const DEFAULT_IO_THREADS: usize = 4;

/// Configuration for the confirmation pass.
#[derive(Clone)]
pub struct ConfirmConfig {
    /// Number of I/O threads for parallel fingerprinting.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ConfirmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl ConfirmConfig {
    /// Set the I/O thread count (at least one).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
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

/// Statistics from the confirmation pass.
#[derive(Debug, Clone, Default)]
pub struct ConfirmStats {
    /// Files that entered confirmation
    pub input_files: usize,
    /// Files dropped because their candidate key was unique
    pub pruned_singletons: usize,
    /// Files successfully fingerprinted
    pub hashed_files: usize,
    /// Files that could not be read
    pub failed_files: usize,
    /// Read errors, one per failed file
    pub errors: Vec<HashError>,
    /// Files whose fingerprint matched no sibling
    pub unique_fingerprints: usize,
    /// Number of confirmed duplicate sets
    pub duplicate_sets: usize,
    /// Whether fingerprinting was cut short by shutdown
    pub interrupted: bool,
}

/// Outcome of fingerprinting one path.
enum Outcome {
    Hashed(Fingerprint),
    Failed(HashError),
    Skipped,
}

/// Confirm candidate groups by prefix fingerprint.
///
/// Consumes the candidate groups and returns the confirmed duplicate sets.
/// Per-file read failures never abort the pass; they are returned in
/// [`ConfirmStats::errors`] and the path is left out.
pub fn confirm(
    candidates: CandidateGroups,
    hasher: Arc<Hasher>,
    config: &ConfirmConfig,
) -> (DuplicateSets, ConfirmStats) {
    let mut stats = ConfirmStats {
        input_files: candidates.total_files(),
        ..Default::default()
    };

    let mut keys: Vec<CandidateKey> = Vec::new();
    let mut work: Vec<(usize, PathBuf)> = Vec::new();
    for (key, paths) in candidates {
        if paths.len() < 2 {
            stats.pruned_singletons += paths.len();
            continue;
        }
        let group = keys.len();
        keys.push(key);
        work.extend(paths.into_iter().map(|p| (group, p)));
    }

    if work.is_empty() {
        log::debug!("Confirmation: no candidate group has more than one member");
        return (DuplicateSets::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_FINGERPRINTING, work.len());
    }

    log::info!(
        "Fingerprinting {} files in {} candidate groups ({} threads)",
        work.len(),
        keys.len(),
        config.io_threads
    );

    // Completion count; workers finish out of order.
    let completed = AtomicUsize::new(0);
    let fingerprint_all = || -> Vec<(usize, PathBuf, Outcome)> {
        work.into_par_iter()
            .map(|(group, path)| {
                if config.is_shutdown_requested() {
                    return (group, path, Outcome::Skipped);
                }

                let result = hasher.fingerprint(&path);
                if let Some(ref callback) = config.progress_callback {
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    callback.on_progress(done, path.to_string_lossy().as_ref());
                }

                match result {
                    Ok(fp) => {
                        log::trace!("Fingerprint computed: {}", path.display());
                        (group, path, Outcome::Hashed(fp))
                    }
                    Err(_) if config.is_shutdown_requested() => (group, path, Outcome::Skipped),
                    Err(e) => {
                        log::warn!("Failed to fingerprint {}: {}", path.display(), e);
                        (group, path, Outcome::Failed(e))
                    }
                }
            })
            .collect()
    };

    let results = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.io_threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(fingerprint_all),
        Err(e) => {
            log::warn!(
                "Failed to create fingerprint thread pool ({}), using global pool with {} threads",
                e,
                rayon::current_num_threads()
            );
            fingerprint_all()
        }
    };

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_FINGERPRINTING);
    }

    // Per-group split by fingerprint. Vec keeps traversal order of members.
    let mut by_group: Vec<HashMap<Fingerprint, Vec<PathBuf>>> =
        (0..keys.len()).map(|_| HashMap::new()).collect();

    for (group, path, outcome) in results {
        match outcome {
            Outcome::Hashed(fp) => {
                stats.hashed_files += 1;
                by_group[group].entry(fp).or_default().push(path);
            }
            Outcome::Failed(e) => {
                stats.failed_files += 1;
                stats.errors.push(e);
            }
            Outcome::Skipped => stats.interrupted = true,
        }
    }

    if stats.interrupted || config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Fingerprinting interrupted by shutdown signal");
        return (DuplicateSets::new(), stats);
    }

    let mut sets = DuplicateSets::new();
    for (key, splits) in keys.into_iter().zip(by_group) {
        for (fingerprint, paths) in splits {
            if paths.len() < 2 {
                stats.unique_fingerprints += paths.len();
                continue;
            }
            sets.insert(DuplicateKey::new(fingerprint, key.size, key.name.clone()), paths);
        }
    }
    stats.duplicate_sets = sets.len();

    log::info!(
        "Confirmation complete: {} duplicate sets, {} unique fingerprints, {} failed",
        stats.duplicate_sets,
        stats.unique_fingerprints,
        stats.failed_files
    );

    (sets, stats)
}
