//! Line-level conversion for tab-delimited records.
//!
//! The [`TabDelimitedRecord`] trait defines how a record is parsed from, and
//! serialized back to, a single tab-delimited line.
//!
//! # Examples
//!
//! ```
//! use aliquot_maf::formats::primitives::TabDelimitedRecord;
//! use aliquot_maf::Result;
//!
//! #[derive(Debug, PartialEq)]
//! struct Locus {
//!     chrom: String,
//!     start: String,
//! }
//!
//! impl TabDelimitedRecord for Locus {
//!     fn from_line(line: &str) -> Result<Self> {
//!         let mut fields = line.split('\t');
//!         Ok(Locus {
//!             chrom: fields.next().unwrap_or_default().to_string(),
//!             start: fields.next().unwrap_or_default().to_string(),
//!         })
//!     }
//!
//!     fn to_line(&self) -> String {
//!         format!("{}\t{}", self.chrom, self.start)
//!     }
//! }
//!
//! let locus = Locus::from_line("chr1\t100").unwrap();
//! assert_eq!(locus.to_line(), "chr1\t100");
//! ```

use crate::error::Result;

/// Trait for types that can be parsed from tab-delimited lines.
pub trait TabDelimitedRecord: Sized {
    /// Parse a record from a tab-delimited line.
    ///
    /// The line should not include the trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is malformed or contains invalid data.
    fn from_line(line: &str) -> Result<Self>;

    /// Serialize this record to a tab-delimited line.
    ///
    /// The returned string should not include a trailing newline.
    fn to_line(&self) -> String;
}

/// Strip a trailing line terminator (`\n` or `\r\n`) and other trailing whitespace.
pub(crate) fn trim_line_end(line: &str) -> &str {
    line.trim_end()
}
