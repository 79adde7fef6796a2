//! Shared primitives for tab-delimited bioinformatics formats.
//!
//! MAF files share the usual tab-delimited layout: `#` comment/pragma lines,
//! one line per record, fields separated by tabs.

pub mod tab_delimited;

pub use tab_delimited::TabDelimitedRecord;
