//! Output destinations for aggregated MAF files
//!
//! `DataSink` is the write counterpart to
//! [`DataSource`](crate::io::compression::DataSource).
//!
//! # Example
//!
//! ```no_run
//! use aliquot_maf::io::DataSink;
//!
//! // Gzipped project-level MAF
//! let sink = DataSink::from_path("project.maf.gz");
//! assert!(sink.is_compressed());
//!
//! // Plain text on stdout, for piping
//! let sink = DataSink::stdout();
//! ```

use std::path::{Path, PathBuf};

/// Output destination for streaming writes
#[derive(Debug, Clone)]
pub enum DataSink {
    /// Write to a local file path
    ///
    /// Compression format is detected from the file extension:
    /// - `.gz`, `.gzip` → gzip compression
    /// - other → uncompressed (including `.bgz`; the writer does not emit
    ///   BGZF blocks)
    Local(PathBuf),

    /// Write to standard output (always uncompressed)
    Stdout,
}

impl DataSink {
    /// Create a sink from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::Local(path.as_ref().to_path_buf())
    }

    /// Create a sink for standard output
    pub fn stdout() -> Self {
        Self::Stdout
    }

    pub(crate) fn extension(&self) -> Option<&str> {
        match self {
            Self::Local(path) => path.extension().and_then(|s| s.to_str()),
            Self::Stdout => None,
        }
    }

    /// Check if this sink represents a compressed output
    pub fn is_compressed(&self) -> bool {
        matches!(self.extension(), Some("gz") | Some("gzip"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        let sink = DataSink::from_path("project.maf");
        match sink {
            DataSink::Local(path) => assert_eq!(path, PathBuf::from("project.maf")),
            _ => panic!("Expected Local variant"),
        }
    }

    #[test]
    fn test_extension_detection() {
        assert_eq!(DataSink::from_path("a.maf.gz").extension(), Some("gz"));
        assert_eq!(DataSink::from_path("a.maf.bgz").extension(), Some("bgz"));
        assert_eq!(DataSink::from_path("a.maf").extension(), Some("maf"));
        assert_eq!(DataSink::stdout().extension(), None);
    }

    #[test]
    fn test_is_compressed() {
        assert!(DataSink::from_path("a.maf.gz").is_compressed());
        assert!(DataSink::from_path("a.maf.gzip").is_compressed());
        assert!(!DataSink::from_path("a.maf").is_compressed());
        assert!(!DataSink::from_path("a.maf.bgz").is_compressed());
        assert!(!DataSink::stdout().is_compressed());
    }
}
