//! BLAKE3 prefix fingerprinting.
//!
//! # Overview
//!
//! A fingerprint is the BLAKE3 digest of at most the first
//! [`FINGERPRINT_PREFIX_LEN`] bytes of a file. Two files with equal size and
//! equal fingerprint are treated as duplicates. Files that agree on the
//! prefix but differ later are reported too; only the prefix is read.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::HashError;

/// Number of leading bytes that contribute to a fingerprint.
pub const FINGERPRINT_PREFIX_LEN: usize = 1000;

/// A 32-byte BLAKE3 digest.
pub type Fingerprint = [u8; 32];

/// Computes prefix fingerprints.
#[derive(Debug, Clone)]
pub struct Hasher {
    prefix_len: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher that reads [`FINGERPRINT_PREFIX_LEN`] bytes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix_len: FINGERPRINT_PREFIX_LEN,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag; a set flag makes [`Hasher::fingerprint`] fail
    /// with [`std::io::ErrorKind::Interrupted`] before opening the file.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Number of bytes read per file.
    #[must_use]
    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Fingerprint the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or read.
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint, HashError> {
        if self
            .shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
        {
            return Err(HashError::from_io(
                path,
                std::io::Error::new(std::io::ErrorKind::Interrupted, "Shutdown"),
            ));
        }

        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.fingerprint_reader(file)
            .map_err(|e| HashError::from_io(path, e))
    }

    /// Fingerprint the leading bytes of any reader.
    ///
    /// Short reads are retried until the prefix is full or EOF is reached.
    ///
    /// # Errors
    ///
    /// Propagates read errors from `reader`.
    pub fn fingerprint_reader<R: Read>(&self, reader: R) -> std::io::Result<Fingerprint> {
        let mut buffer = Vec::with_capacity(self.prefix_len);
        reader
            .take(self.prefix_len as u64)
            .read_to_end(&mut buffer)?;
        Ok(*blake3::hash(&buffer).as_bytes())
    }
}

/// Hex-encode a fingerprint (64 lowercase characters).
#[must_use]
pub fn hash_to_hex(hash: &Fingerprint) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}

/// Parse a 64-character hex string back into a fingerprint.
#[must_use]
pub fn hex_to_hash(hex: &str) -> Option<Fingerprint> {
    blake3::Hash::from_hex(hex).ok().map(|h| *h.as_bytes())
}
