//! Human-readable text report.
//!
//! ```text
//! Duplicate files found:
//!
//! Checksum: 3f9a..., Size: 7340032 bytes
//!  - /data/a/movie.mkv
//!  - /data/b/movie.mkv
//!
//! Total extra data stored as duplicates: 7.00 MB
//! ```

use std::io::{self, Write};

use yansi::Paint;

use crate::duplicates::DuplicateSets;

/// Bytes per megabyte in the report footer.
const MEGABYTE: f64 = 1024.0 * 1024.0;

/// Text report formatter.
pub struct TextOutput<'a> {
    sets: &'a DuplicateSets,
    colored: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a formatter; `colored` enables bold headings.
    #[must_use]
    pub fn new(sets: &'a DuplicateSets, colored: bool) -> Self {
        Self { sets, colored }
    }

    fn heading(&self, text: &str) -> String {
        if self.colored {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn footer(&self, text: &str) -> String {
        if self.colored {
            text.yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.sets.is_empty() {
            writeln!(writer, "No duplicate files found.")?;
            return Ok(());
        }

        writeln!(writer, "{}", self.heading("Duplicate files found:"))?;
        for set in self.sets.iter() {
            writeln!(writer)?;
            writeln!(
                writer,
                "{}",
                self.heading(&format!(
                    "Checksum: {}, Size: {} bytes",
                    set.key.fingerprint_hex(),
                    set.key.size
                ))
            )?;
            for path in set.paths {
                writeln!(writer, " - {}", path.display())?;
            }
        }

        let megabytes = self.sets.redundant_bytes() as f64 / MEGABYTE;
        writeln!(writer)?;
        writeln!(
            writer,
            "{}",
            self.footer(&format!(
                "Total extra data stored as duplicates: {:.2} MB",
                megabytes
            ))
        )?;
        Ok(())
    }

    /// Render the report into a string.
    ///
    /// # Errors
    ///
    /// Only fails if the output is not valid UTF-8, which cannot happen for
    /// lossy path display.
    pub fn render(&self) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
