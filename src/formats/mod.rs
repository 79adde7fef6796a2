//! MAF format support.
//!
//! - [`primitives`]: shared tab-delimited infrastructure
//! - [`maf`]: pragma block, column header and row streaming
//! - [`maf_writer`]: project-level MAF writer

pub mod maf;
pub mod maf_writer;
pub mod primitives;

pub use maf::{ColumnHeaders, MafFileHeader, MafReader, ProjectHeader};
pub use maf_writer::MafWriter;
