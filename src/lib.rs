//! aliquot_maf: merge aliquot-level MAF files and select primary aliquots
//!
//! # Overview
//!
//! Two independent batch transforms over somatic variant calls in MAF
//! (Mutation Annotation Format):
//!
//! - **Aggregation**: stream N gzipped aliquot-level MAFs into one gzipped
//!   project-level MAF, after checking that every input shares the same
//!   `#version`, `#annotation.spec` and column header line.
//! - **Selection**: for each case, choose one primary aliquot among several
//!   candidate MAFs by sample type, then creation date, then id.
//!
//! ## Quick Start
//!
//! ```no_run
//! use aliquot_maf::{aggregate_mafs, AliquotLevelMaf};
//! use std::fs::File;
//!
//! # fn main() -> aliquot_maf::Result<()> {
//! let mut mafs = vec![
//!     AliquotLevelMaf::open("a.wxs.aliquot_ensemble_masked.maf.gz", "TCGA-AA-0001-01A")?,
//!     AliquotLevelMaf::open("b.wxs.aliquot_ensemble_masked.maf.gz", "TCGA-AA-0002-01A")?,
//! ];
//!
//! let output = File::create("project.maf.gz")?;
//! let summary = aggregate_mafs(&mut mafs, output)?;
//! println!("{} rows", summary.rows_written);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`aggregation`]: MAF aggregation
//! - [`selection`]: primary-aliquot selection
//! - [`formats`]: MAF header parsing, validation and writing
//! - [`io`]: gzip detection, compressed writers, sinks
//! - [`clock`]: injectable date source for `#filedate`

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod aggregation;
pub mod clock;
pub mod error;
pub mod formats;
pub mod io;
pub mod selection;

// Re-export commonly used types
pub use aggregation::{aggregate_mafs, AggregationSummary, AliquotLevelMaf, MafAggregator};
pub use error::{MafError, Result, ValidationError, ValidationKind};
pub use selection::{
    select_primary_aliquots, PrimaryAliquot, PrimaryAliquotSelectionCriterion, SampleCriterion,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
