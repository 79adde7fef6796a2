//! Project-level MAF writer with compression support
//!
//! Writes the five combined pragmas and the column header line once, then
//! data rows copied from aliquot-level inputs.
//!
//! # Example
//!
//! ```no_run
//! use aliquot_maf::formats::maf::{ColumnHeaders, MafReader, ProjectHeader};
//! use aliquot_maf::formats::maf_writer::MafWriter;
//! use chrono::NaiveDate;
//!
//! # fn main() -> aliquot_maf::Result<()> {
//! let header = ProjectHeader {
//!     version: "gdc-1.0.0".to_string(),
//!     file_date: NaiveDate::from_ymd_opt(2020, 3, 23).unwrap(),
//!     annotation_spec: "gdc-1.0.0-aliquot-merged-masked".to_string(),
//!     submitter_ids: vec!["TCGA-01".to_string()],
//! };
//! let columns = ColumnHeaders::new(vec!["Hugo_Symbol".to_string(), "Chromosome".to_string()]);
//!
//! let mut writer = MafWriter::create("project.maf.gz")?;
//! writer.write_header(&header, &columns)?;
//! let mut rows = MafReader::new(&b"TP53\tchr17\n"[..]);
//! writer.copy_rows_from(&mut rows)?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

use crate::error::{MafError, Result};
use crate::formats::maf::{ColumnHeaders, MafReader, ProjectHeader};
use crate::formats::primitives::TabDelimitedRecord;
use crate::io::compression::CompressedWriter;
use crate::io::sink::DataSink;
use std::io::{BufRead, Write};
use std::path::Path;

/// MAF writer that enforces header-before-rows
pub struct MafWriter<'a> {
    writer: CompressedWriter<'a>,
    rows_written: usize,
    header_written: bool,
}

impl<'a> MafWriter<'a> {
    /// Wrap an already configured compressed writer
    pub fn new(writer: CompressedWriter<'a>) -> Self {
        Self {
            writer,
            rows_written: 0,
            header_written: false,
        }
    }

    /// Create a writer for a data sink (compression from file extension)
    pub fn from_sink(sink: DataSink) -> Result<MafWriter<'static>> {
        Ok(MafWriter::new(CompressedWriter::new(sink)?))
    }

    /// Create a writer for a file path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<MafWriter<'static>> {
        MafWriter::from_sink(DataSink::from_path(path))
    }

    /// Write the combined pragmas followed by the column header line
    ///
    /// # Errors
    ///
    /// Returns an error if the header was already written.
    pub fn write_header(&mut self, header: &ProjectHeader, columns: &ColumnHeaders) -> Result<()> {
        if self.header_written {
            return Err(MafError::InvalidInput {
                msg: "MAF header already written".to_string(),
            });
        }

        for line in header.to_pragma_lines() {
            writeln!(self.writer, "{}", line)?;
        }
        writeln!(self.writer, "{}", columns.to_line())?;

        self.header_written = true;
        Ok(())
    }

    /// Copy the remaining rows of an input verbatim
    ///
    /// Returns the number of rows copied.
    pub fn copy_rows_from<R: BufRead>(&mut self, reader: &mut MafReader<R>) -> Result<usize> {
        self.ensure_header()?;
        let rows = reader.copy_rows(&mut self.writer)?;
        self.rows_written += rows;
        Ok(rows)
    }

    fn ensure_header(&self) -> Result<()> {
        if self.header_written {
            Ok(())
        } else {
            Err(MafError::InvalidInput {
                msg: "MAF: Header must be written before rows".to_string(),
            })
        }
    }

    /// Number of data rows written so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Check if header has been written
    pub fn header_written(&self) -> bool {
        self.header_written
    }

    /// Finish writing, finalizing the compression stream
    pub fn finish(self) -> Result<()> {
        self.writer.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn project_header() -> ProjectHeader {
        ProjectHeader {
            version: "gdc-1.0.0".to_string(),
            file_date: NaiveDate::from_ymd_opt(2021, 12, 1).unwrap(),
            annotation_spec: "spec".to_string(),
            submitter_ids: vec!["a".to_string(), "b".to_string()],
        }
    }

    fn columns() -> ColumnHeaders {
        ColumnHeaders::new(vec!["Hugo_Symbol".to_string(), "Chromosome".to_string()])
    }

    #[test]
    fn test_header_then_rows() {
        let mut buffer = Vec::new();
        {
            let mut writer = MafWriter::new(CompressedWriter::new_plain(&mut buffer).unwrap());
            writer.write_header(&project_header(), &columns()).unwrap();
            assert!(writer.header_written());

            let mut first = MafReader::new(&b"TP53\tchr17\n"[..]);
            assert_eq!(writer.copy_rows_from(&mut first).unwrap(), 1);
            let mut second = MafReader::new(&b"KRAS\tchr12\nEGFR\tchr7\n"[..]);
            assert_eq!(writer.copy_rows_from(&mut second).unwrap(), 2);
            assert_eq!(writer.rows_written(), 3);
            writer.finish().unwrap();
        }

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "#version gdc-1.0.0");
        assert_eq!(lines[1], "#filedate 20211201");
        assert_eq!(lines[4], "#tumor.aliquots.submitter_id a,b");
        assert_eq!(lines[5], "Hugo_Symbol\tChromosome");
        assert_eq!(lines[8], "EGFR\tchr7");
    }

    #[test]
    fn test_rows_before_header_rejected() {
        let mut buffer = Vec::new();
        let mut writer = MafWriter::new(CompressedWriter::new_plain(&mut buffer).unwrap());
        assert!(matches!(
            writer.copy_rows_from(&mut MafReader::new(&b"TP53\n"[..])),
            Err(MafError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_header_written_twice_rejected() {
        let mut buffer = Vec::new();
        let mut writer = MafWriter::new(CompressedWriter::new_plain(&mut buffer).unwrap());
        writer.write_header(&project_header(), &columns()).unwrap();
        assert!(writer.write_header(&project_header(), &columns()).is_err());
    }
}
