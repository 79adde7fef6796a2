//! I/O module: compression detection and output sinks

pub mod compression;
pub mod sink;

pub use compression::{CompressedReader, CompressedWriter, DataSource};
pub use sink::DataSink;
