//! Storage of snapshots on disk.

use crate::snapshot::data::{Snapshot, SNAPSHOT_VERSION};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Prefix of every snapshot file name.
const FILE_PREFIX: &str = "duplicate_files_";

/// Envelope for snapshot files to include integrity checks.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEnvelope {
    /// SHA256 checksum of the compact snapshot JSON.
    checksum: String,
    /// The snapshot itself.
    snapshot: Snapshot,
}

/// Turn a root path into a file-name fragment.
///
/// Leading and trailing separators are trimmed, then `/`, `\` and `:` are
/// replaced by `_`.
///
/// ```
/// use dupescan::snapshot::sanitize_root;
///
/// assert_eq!(sanitize_root("/home/me/Photos/"), "home_me_Photos");
/// assert_eq!(sanitize_root(r"C:\Users\me"), "C__Users_me");
/// ```
#[must_use]
pub fn sanitize_root(root: &str) -> String {
    root.trim_matches(|c| c == '/' || c == '\\')
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            other => other,
        })
        .collect()
}

/// File name of the snapshot for `root`, derived from the root as typed.
#[must_use]
pub fn snapshot_file_name(root: &Path) -> String {
    format!("{}{}.json", FILE_PREFIX, sanitize_root(&root.to_string_lossy()))
}

/// Platform data directory for snapshots, if one can be determined.
#[must_use]
pub fn default_snapshot_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dupescan").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Whether two spellings name the same root.
///
/// Compared component-wise, so trailing separators are ignored while a
/// leading `/` or a different separator position is not.
fn same_root(stored: &Path, requested: &Path) -> bool {
    stored.components().eq(requested.components())
}

fn checksum(snapshot: &Snapshot) -> Result<String> {
    // Compact serialization; save and load must agree on it.
    let json = serde_json::to_string(snapshot)
        .context("Failed to serialize snapshot for checksum calculation")?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Directory holding one snapshot file per scanned root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store at `dir` if given, else the platform data directory, else the
    /// current directory.
    #[must_use]
    pub fn resolve(dir: Option<PathBuf>) -> Self {
        let dir = dir
            .or_else(default_snapshot_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }

    /// Directory in use.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the snapshot file for `root`.
    #[must_use]
    pub fn path_for(&self, root: &Path) -> PathBuf {
        self.dir.join(snapshot_file_name(root))
    }

    /// Serialize `snapshot` with its checksum envelope.
    pub fn to_json(snapshot: &Snapshot) -> Result<String> {
        let envelope = SnapshotEnvelope {
            checksum: checksum(snapshot)?,
            snapshot: snapshot.clone(),
        };
        serde_json::to_string_pretty(&envelope).context("Failed to serialize snapshot envelope")
    }

    /// Save `snapshot`, replacing any previous one for the same root.
    ///
    /// Returns the path written.
    pub fn save(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create snapshot directory: {}", self.dir.display())
        })?;

        let path = self.path_for(&snapshot.root);
        let tmp = path.with_extension("json.tmp");
        let json = Self::to_json(snapshot)?;

        let mut file = File::create(&tmp)
            .with_context(|| format!("Failed to create snapshot file: {}", tmp.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write snapshot to: {}", tmp.display()))?;
        file.sync_all()
            .with_context(|| format!("Failed to flush snapshot: {}", tmp.display()))?;
        drop(file);

        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to move snapshot into place: {}", path.display()))?;

        log::debug!(
            "Saved snapshot with {} sets to {}",
            snapshot.sets.len(),
            path.display()
        );
        Ok(path)
    }

    /// Load the snapshot for `root`.
    ///
    /// Returns `Ok(None)` when no snapshot exists, or when the file found
    /// was written for a different root that sanitizes to the same name. A
    /// stored snapshot with zero sets is `Ok(Some(_))`.
    ///
    /// # Errors
    ///
    /// Unreadable file, malformed JSON, checksum mismatch or an unsupported
    /// format version.
    pub fn load(&self, root: &Path) -> Result<Option<Snapshot>> {
        let path = self.path_for(root);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No snapshot at {}", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read snapshot file: {}", path.display()))
            }
        };

        let envelope: SnapshotEnvelope = serde_json::from_str(&content).with_context(|| {
            format!(
                "Failed to parse snapshot {}. The file might be corrupted.",
                path.display()
            )
        })?;

        if checksum(&envelope.snapshot)? != envelope.checksum {
            anyhow::bail!(
                "Snapshot integrity check failed for {}: checksum mismatch",
                path.display()
            );
        }

        let snapshot = envelope.snapshot;
        if snapshot.version != SNAPSHOT_VERSION {
            anyhow::bail!(
                "Unsupported snapshot version: {}. Current version is {}.",
                snapshot.version,
                SNAPSHOT_VERSION
            );
        }

        // Distinct roots can share a file name; only the exact root matches.
        if !same_root(&snapshot.root, root) {
            log::warn!(
                "Snapshot {} belongs to {}, not {}; ignoring it",
                path.display(),
                snapshot.root.display(),
                root.display()
            );
            return Ok(None);
        }

        Ok(Some(snapshot))
    }
}
