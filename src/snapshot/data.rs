//! Data structures for stored snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;

use super::os_text;

use crate::duplicates::{DuplicateKey, DuplicateSets, ScanSummary};
use crate::scanner::hex_to_hash;

/// Current version of the snapshot file format.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The stored result of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version.
    pub version: u32,
    /// When the scan finished.
    pub created_at: DateTime<Utc>,
    /// Root path exactly as given on the command line.
    #[serde(with = "os_text::one")]
    pub root: PathBuf,
    /// Minimum file size in bytes used for the scan.
    pub min_size: u64,
    /// Confirmed duplicate sets.
    pub sets: Vec<SnapshotSet>,
}

/// One duplicate set in serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSet {
    /// Hex-encoded prefix fingerprint.
    pub fingerprint: String,
    /// Size in bytes of every member.
    pub size: u64,
    /// Base name shared by every member.
    #[serde(with = "os_text::one")]
    pub name: OsString,
    /// Member paths.
    #[serde(with = "os_text::paths")]
    pub paths: Vec<PathBuf>,
}

impl Snapshot {
    /// Build a snapshot from confirmed duplicate sets.
    pub fn new(root: impl Into<PathBuf>, min_size: u64, sets: &DuplicateSets) -> Self {
        let sets = sets
            .iter()
            .map(|set| SnapshotSet {
                fingerprint: set.key.fingerprint_hex(),
                size: set.key.size,
                name: set.key.name.clone(),
                paths: set.paths.to_vec(),
            })
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            root: root.into(),
            min_size,
            sets,
        }
    }

    /// Rebuild the duplicate sets exactly as stored.
    ///
    /// Paths are not checked against the filesystem.
    ///
    /// # Errors
    ///
    /// Fails if a stored fingerprint is not valid hex.
    pub fn to_sets(&self) -> anyhow::Result<DuplicateSets> {
        let mut sets = DuplicateSets::new();
        for (idx, set) in self.sets.iter().enumerate() {
            let fingerprint = hex_to_hash(&set.fingerprint).ok_or_else(|| {
                anyhow::anyhow!(
                    "Snapshot set {} has an invalid fingerprint: {:?}",
                    idx,
                    set.fingerprint
                )
            })?;
            let key = DuplicateKey::new(fingerprint, set.size, set.name.clone());
            if !sets.insert(key, set.paths.clone()) {
                log::warn!("Skipping snapshot set {} with fewer than two paths", idx);
            }
        }
        Ok(sets)
    }

    /// Summary counts for a replayed result.
    #[must_use]
    pub fn summary(&self, sets: &DuplicateSets) -> ScanSummary {
        ScanSummary {
            total_files: sets.total_members(),
            total_size: sets
                .iter()
                .map(|s| s.key.size.saturating_mul(s.len() as u64))
                .fold(0u64, u64::saturating_add),
            duplicate_sets: sets.len(),
            duplicate_files: sets.duplicate_files(),
            redundant_bytes: sets.redundant_bytes(),
            ..Default::default()
        }
    }
}
