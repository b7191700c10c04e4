//! Snapshot module for persisting scan results between runs.
//!
//! A `rescan` stores its duplicate sets so that a later `replay` can report
//! them again without touching the filesystem.
//!
//! # Features
//!
//! * **Keyed by root**: one file per scanned root, named after the root path
//!   as it was typed (see [`snapshot_file_name`]).
//! * **Integrity**: each file is wrapped in an envelope with a SHA256 checksum.
//! * **Versioning**: files written by an incompatible format are rejected.
//!
//! # Architecture
//!
//! * [`data`]: Serializable snapshot model and conversion from/to
//!   [`DuplicateSets`](crate::duplicates::DuplicateSets).
//! * [`io`]: Storage location, saving, loading and verification.
//! * [`os_text`]: Byte-exact encoding of paths and names.

pub mod data;
pub mod io;
pub mod os_text;

pub use data::{Snapshot, SnapshotSet, SNAPSHOT_VERSION};
pub use io::{default_snapshot_dir, sanitize_root, snapshot_file_name, SnapshotStore};
