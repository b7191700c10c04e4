//! Candidate groups and confirmed duplicate sets.
//!
//! # Overview
//!
//! Files are first grouped by a cheap [`CandidateKey`] (exact size plus base
//! name). Sharing a candidate key is necessary for two files to be
//! duplicates, never sufficient. The confirmer then turns candidate groups
//! into [`DuplicateSets`], keyed by content fingerprint, size and name.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::CandidateGroups;
//! use dupescan::scanner::FileEntry;
//! use std::path::PathBuf;
//!
//! let mut groups = CandidateGroups::new();
//! groups.insert(FileEntry::new(PathBuf::from("/a/x.txt"), 1024));
//! groups.insert(FileEntry::new(PathBuf::from("/b/x.txt"), 1024));
//! groups.insert(FileEntry::new(PathBuf::from("/b/y.txt"), 1024));
//!
//! assert_eq!(groups.len(), 2);
//! assert_eq!(groups.multi_member_groups().count(), 1);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, FileEntry, Fingerprint};

/// The (size, base name) pair used to pre-filter files before hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateKey {
    /// Exact size in bytes
    pub size: u64,
    /// Base file name, case-sensitive
    pub name: OsString,
}

impl CandidateKey {
    /// Create a candidate key.
    #[must_use]
    pub fn new(size: u64, name: impl Into<OsString>) -> Self {
        Self {
            size,
            name: name.into(),
        }
    }
}

impl From<&FileEntry> for CandidateKey {
    fn from(entry: &FileEntry) -> Self {
        Self::new(entry.size, entry.name.clone())
    }
}

/// Paths grouped by [`CandidateKey`], in traversal insertion order.
///
/// Built once per scan by the collector and consumed by the confirmer.
#[derive(Debug, Clone, Default)]
pub struct CandidateGroups {
    groups: HashMap<CandidateKey, Vec<PathBuf>>,
    total_files: usize,
}

impl CandidateGroups {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file under its candidate key.
    pub fn insert(&mut self, entry: FileEntry) {
        let key = CandidateKey::from(&entry);
        self.groups.entry(key).or_default().push(entry.path);
        self.total_files += 1;
    }

    /// Number of distinct candidate keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no file was inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of files across all groups.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /// Paths recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &CandidateKey) -> Option<&[PathBuf]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    /// Iterate over all groups.
    pub fn iter(&self) -> impl Iterator<Item = (&CandidateKey, &Vec<PathBuf>)> {
        self.groups.iter()
    }

    /// Iterate over groups with two or more members.
    pub fn multi_member_groups(&self) -> impl Iterator<Item = (&CandidateKey, &Vec<PathBuf>)> {
        self.groups.iter().filter(|(_, paths)| paths.len() > 1)
    }

    /// Grouping statistics for logging and the scan summary.
    #[must_use]
    pub fn stats(&self) -> GroupingStats {
        let mut stats = GroupingStats {
            total_files: self.total_files,
            candidate_keys: self.groups.len(),
            ..Default::default()
        };
        for paths in self.groups.values() {
            if paths.len() > 1 {
                stats.candidate_groups += 1;
                stats.potential_duplicates += paths.len();
            } else {
                stats.eliminated_unique += paths.len();
            }
        }
        stats
    }
}

impl FromIterator<FileEntry> for CandidateGroups {
    fn from_iter<I: IntoIterator<Item = FileEntry>>(iter: I) -> Self {
        let mut groups = Self::new();
        for entry in iter {
            groups.insert(entry);
        }
        groups
    }
}

impl IntoIterator for CandidateGroups {
    type Item = (CandidateKey, Vec<PathBuf>);
    type IntoIter = std::collections::hash_map::IntoIter<CandidateKey, Vec<PathBuf>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Statistics from candidate grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files collected
    pub total_files: usize,
    /// Number of distinct candidate keys
    pub candidate_keys: usize,
    /// Number of candidate keys shared by 2+ files
    pub candidate_groups: usize,
    /// Files that share their candidate key with at least one other file
    pub potential_duplicates: usize,
    /// Files eliminated because their candidate key is unique
    pub eliminated_unique: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated without reading any content.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Key of a confirmed duplicate set.
///
/// The name is part of the key so that two name-distinct groups with the
/// same prefix and size stay separate sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DuplicateKey {
    /// Fingerprint of the first bytes shared by every member
    pub fingerprint: Fingerprint,
    /// Size shared by every member; authoritative for all of them
    pub size: u64,
    /// Base name shared by every member
    pub name: OsString,
}

impl DuplicateKey {
    /// Create a duplicate-set key.
    #[must_use]
    pub fn new(fingerprint: Fingerprint, size: u64, name: impl Into<OsString>) -> Self {
        Self {
            fingerprint,
            size,
            name: name.into(),
        }
    }

    /// Fingerprint as hexadecimal string.
    #[must_use]
    pub fn fingerprint_hex(&self) -> String {
        hash_to_hex(&self.fingerprint)
    }
}

/// A borrowed view of one duplicate set.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateSet<'a> {
    /// The set's key
    pub key: &'a DuplicateKey,
    /// All member paths (at least two)
    pub paths: &'a [PathBuf],
}

impl DuplicateSet<'_> {
    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Always false for a set taken from [`DuplicateSets`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of copies beyond the first.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Bytes held by all copies beyond the first: `(n - 1) * size`.
    #[must_use]
    pub fn redundant_bytes(&self) -> u64 {
        (self.duplicate_count() as u64).saturating_mul(self.key.size)
    }
}

/// Confirmed duplicate sets, the terminal output of a scan.
///
/// Every set holds at least two paths, and a path is held by at most one
/// set. Enumeration order is the key order, so reports are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateSets {
    sets: BTreeMap<DuplicateKey, Vec<PathBuf>>,
}

impl DuplicateSets {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed set.
    ///
    /// Returns `false` and stores nothing when `paths` has fewer than two
    /// members. Members already recorded under the same key are kept and the
    /// new ones appended.
    pub fn insert(&mut self, key: DuplicateKey, paths: Vec<PathBuf>) -> bool {
        if paths.len() < 2 {
            return false;
        }
        self.sets.entry(key).or_default().extend(paths);
        true
    }

    /// Number of sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether no duplicates were confirmed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Members of the set with `key`.
    #[must_use]
    pub fn get(&self, key: &DuplicateKey) -> Option<&[PathBuf]> {
        self.sets.get(key).map(Vec::as_slice)
    }

    /// Iterate over all sets in key order.
    pub fn iter(&self) -> impl Iterator<Item = DuplicateSet<'_>> {
        self.sets.iter().map(|(key, paths)| DuplicateSet {
            key,
            paths: paths.as_slice(),
        })
    }

    /// Total number of redundant copies across all sets.
    #[must_use]
    pub fn duplicate_files(&self) -> usize {
        self.iter().map(|s| s.duplicate_count()).sum()
    }

    /// Total member count across all sets.
    #[must_use]
    pub fn total_members(&self) -> usize {
        self.sets.values().map(Vec::len).sum()
    }

    /// Total bytes of redundant storage: sum of `(n - 1) * size` over sets.
    ///
    /// # Example
    ///
    /// ```
    /// use dupescan::duplicates::{DuplicateKey, DuplicateSets};
    /// use std::path::PathBuf;
    ///
    /// let mut sets = DuplicateSets::new();
    /// sets.insert(
    ///     DuplicateKey::new([0u8; 32], 100, "a.bin"),
    ///     vec![PathBuf::from("/1/a.bin"), PathBuf::from("/2/a.bin"), PathBuf::from("/3/a.bin")],
    /// );
    /// assert_eq!(sets.redundant_bytes(), 200);
    /// ```
    #[must_use]
    pub fn redundant_bytes(&self) -> u64 {
        self.iter()
            .fold(0u64, |acc, set| acc.saturating_add(set.redundant_bytes()))
    }
}

impl IntoIterator for DuplicateSets {
    type Item = (DuplicateKey, Vec<PathBuf>);
    type IntoIter = std::collections::btree_map::IntoIter<DuplicateKey, Vec<PathBuf>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sets.into_iter()
    }
}
