//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Candidate grouping by size and base name (collection)
//! - Prefix fingerprint comparison (confirmation)
//! - Duplicate set management and redundancy accounting

pub mod collector;
pub mod confirmer;
pub mod finder;
pub mod groups;

pub use collector::{collect_candidates, validate_root, CollectStats, CollectorConfig};
pub use confirmer::{confirm, ConfirmConfig, ConfirmStats};
pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{
    CandidateGroups, CandidateKey, DuplicateKey, DuplicateSet, DuplicateSets, GroupingStats,
};
