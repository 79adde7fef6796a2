//! Error types for aliquot_maf

use std::fmt;
use thiserror::Error;

/// Result type alias for aliquot_maf operations
pub type Result<T> = std::result::Result<T, MafError>;

/// Error types that can occur while reading, validating or writing MAF files
#[derive(Debug, Error)]
pub enum MafError {
    /// I/O error (includes undecodable, non-UTF-8 text)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input files disagree on their schema
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Pragma line without a `key value` separator
    #[error("Invalid pragma at line {line}: {content}")]
    InvalidPragma {
        /// Line number where error occurred (1-based)
        line: usize,
        /// The offending line, without the leading `#`
        content: String,
    },

    /// Non-empty pragma block lacking a required key
    #[error("{key} must be defined")]
    MissingPragma {
        /// The missing pragma key
        key: &'static str,
    },

    /// Stream ended after the pragma block, before the column header line
    #[error("Missing column header line after pragma block")]
    MissingColumnHeaders,

    /// Writer used out of order
    #[error("Invalid input: {msg}")]
    InvalidInput {
        /// Error message
        msg: String,
    },
}

/// Which schema check rejected an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// `version` and/or `annotation.spec` pragma mismatch
    FileHeader,
    /// Column header line mismatch
    ColumnHeaders,
}

/// Schema mismatch between an input file and the reference (first) file
///
/// Displays as the short message followed by the details on the next line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Which check failed
    pub kind: ValidationKind,
    /// A short message describing the validation error
    pub message: String,
    /// The differing values
    pub details: String,
}

impl ValidationError {
    pub(crate) fn new(
        kind: ValidationKind,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            details: details.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.message, self.details)
    }
}

impl std::error::Error for ValidationError {}
