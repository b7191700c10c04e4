//! CSV output formatter for duplicate scan results.
//!
//! One row is generated for each member of each duplicate set.
//!
//! # Columns
//!
//! - `set_id`: 1-based number of the duplicate set
//! - `fingerprint`: prefix fingerprint (hexadecimal)
//! - `size`: file size in bytes
//! - `name`: shared base name
//! - `path`: member path

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DuplicateSets;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    set_id: usize,
    fingerprint: &'a str,
    size: u64,
    name: &'a str,
    path: String,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    sets: &'a DuplicateSets,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(sets: &'a DuplicateSets) -> Self {
        Self { sets }
    }

    /// Write the CSV output to the given writer.
    ///
    /// A header row is always written, even with no sets.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        if self.sets.is_empty() {
            csv_writer.write_record(["set_id", "fingerprint", "size", "name", "path"])?;
        }

        for (idx, set) in self.sets.iter().enumerate() {
            let fingerprint = set.key.fingerprint_hex();
            let name = set.key.name.to_string_lossy();
            for path in set.paths {
                csv_writer.serialize(CsvRow {
                    set_id: idx + 1,
                    fingerprint: &fingerprint,
                    size: set.key.size,
                    name: &name,
                    path: path.to_string_lossy().into_owned(),
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| CsvOutputError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}
