//! Scanner module for directory traversal and prefix fingerprinting.
//!
//! This module provides functionality for:
//! - Explicit work-list directory walking
//! - Content-prefix fingerprints with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: BLAKE3 fingerprint of the first [`FINGERPRINT_PREFIX_LEN`] bytes
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     min_size: 5 * 1024 * 1024,
//! };
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::ffi::OsString;
use std::path::PathBuf;

// Re-export main types
pub use hasher::{hash_to_hex, hex_to_hash, Fingerprint, Hasher, FINGERPRINT_PREFIX_LEN};
pub use walker::Walker;

/// A regular file discovered during traversal.
///
/// Only lives between the walker and the collector; the candidate map keeps
/// paths, not entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the file (absolute when the walk root is absolute)
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Base file name, compared byte-exact
    pub name: OsString,
}

impl FileEntry {
    /// Create a new FileEntry, deriving the base name from the path.
    ///
    /// A path without a final component (e.g. `/`) gets an empty name.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        let name = path.file_name().map(OsString::from).unwrap_or_default();
        Self { path, size, name }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Minimum file size to include (in bytes, inclusive).
    pub min_size: u64,
}

impl WalkerConfig {
    /// Create a configuration with the given minimum size in bytes.
    #[must_use]
    pub fn new(min_size: u64) -> Self {
        Self { min_size }
    }

    /// Create a configuration from a threshold expressed in megabytes.
    #[must_use]
    pub fn from_megabytes(min_size_mb: u64) -> Self {
        Self {
            min_size: megabytes_to_bytes(min_size_mb),
        }
    }
}

/// Convert a megabyte threshold (1 MB = 1024 * 1024 bytes) to bytes.
#[must_use]
pub fn megabytes_to_bytes(megabytes: u64) -> u64 {
    megabytes.saturating_mul(1024 * 1024)
}

/// Errors that can occur during directory scanning.
///
/// None of these abort a scan; they are collected as diagnostics.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while accessing a file or directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::sync::Arc<std::io::Error>,
    },

    /// A file could not be fingerprinted.
    #[error(transparent)]
    HashError(#[from] HashError),
}

impl ScanError {
    /// Classify an I/O error raised while accessing `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                source: std::sync::Arc::new(error),
            },
        }
    }

    /// The path this error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied(path) | Self::NotFound(path) => path,
            Self::Io { path, .. } => path,
            Self::HashError(e) => e.path(),
        }
    }
}

/// Errors that can occur while fingerprinting a file.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::sync::Arc<std::io::Error>,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: std::sync::Arc::new(error),
            },
        }
    }

    /// The path that failed.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}
