//! Aggregation of aliquot-level MAF files into one project-level MAF
//!
//! Every input must agree with the first non-empty input (the reference) on
//! `#version`, `#annotation.spec` and the exact ordered column header line.
//! Data rows are appended in input order, unchanged.
//!
//! The output starts with five synthesized pragmas:
//!
//! ```text
//! #version {version}
//! #filedate {YYYYMMDD}
//! #annotation.spec {annotation_spec}
//! #n.analyzed.samples {number of inputs supplied}
//! #tumor.aliquots.submitter_id {comma-joined submitter ids}
//! ```
//!
//! Inputs without any pragma lines are empty or inaccessible: they are
//! skipped, but still counted in the last two pragmas.
//!
//! # Example
//!
//! ```
//! use aliquot_maf::aggregation::{aggregate_mafs, AliquotLevelMaf};
//!
//! # fn main() -> aliquot_maf::Result<()> {
//! let first = "#version gdc-1.0.0\n#annotation.spec masked\nHugo_Symbol\tChromosome\nTP53\tchr17\n";
//! let second = "#version gdc-1.0.0\n#annotation.spec masked\nHugo_Symbol\tChromosome\nKRAS\tchr12\n";
//!
//! let mut mafs = vec![
//!     AliquotLevelMaf::new(first.as_bytes(), "aliquot-a"),
//!     AliquotLevelMaf::new(second.as_bytes(), "aliquot-b"),
//! ];
//!
//! let mut output = Vec::new();
//! let summary = aggregate_mafs(&mut mafs, &mut output)?;
//! assert_eq!(summary.rows_written, 2);
//! # Ok(())
//! # }
//! ```

use crate::clock::{Clock, SystemClock};
use crate::error::{MafError, Result};
use crate::formats::maf::{ColumnHeaders, MafFileHeader, MafReader, ProjectHeader};
use crate::formats::maf_writer::MafWriter;
use crate::io::compression::{CompressedReader, CompressedWriter, DataSource};
use crate::io::sink::DataSink;
use flate2::Compression;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// An aliquot-level MAF stream and the tumor aliquot it was called on
///
/// The stream is read once, from its current position. It is never closed
/// or rewound by the aggregator.
#[derive(Debug)]
pub struct AliquotLevelMaf<R> {
    /// Gzipped (or plain) MAF content
    pub file: R,
    /// Submitter id of the tumor aliquot
    pub tumor_aliquot_submitter_id: String,
}

impl<R: Read> AliquotLevelMaf<R> {
    /// Pair a stream with its tumor aliquot submitter id
    pub fn new(file: R, tumor_aliquot_submitter_id: impl Into<String>) -> Self {
        Self {
            file,
            tumor_aliquot_submitter_id: tumor_aliquot_submitter_id.into(),
        }
    }
}

impl AliquotLevelMaf<File> {
    /// Open a local MAF file
    pub fn open<P: AsRef<Path>>(
        path: P,
        tumor_aliquot_submitter_id: impl Into<String>,
    ) -> Result<Self> {
        let file = DataSource::from_path(path).open()?;
        Ok(Self::new(file, tumor_aliquot_submitter_id))
    }
}

/// Counts from one aggregation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationSummary {
    /// Inputs supplied, including skipped ones
    pub inputs: usize,
    /// Inputs skipped as empty or inaccessible
    pub skipped: usize,
    /// Data rows written to the output
    pub rows_written: usize,
}

/// Configurable MAF aggregator
///
/// # Example
///
/// ```
/// use aliquot_maf::aggregation::MafAggregator;
/// use aliquot_maf::clock::FixedClock;
/// use chrono::NaiveDate;
///
/// let aggregator = MafAggregator::new()
///     .with_clock(FixedClock(NaiveDate::from_ymd_opt(2020, 3, 23).unwrap()))
///     .with_compression(flate2::Compression::best());
/// ```
pub struct MafAggregator {
    clock: Box<dyn Clock>,
    compression: Compression,
}

impl MafAggregator {
    /// Aggregator using the system clock and default gzip level (6)
    pub fn new() -> Self {
        Self {
            clock: Box::new(SystemClock),
            compression: Compression::default(),
        }
    }

    /// Use a different date source for `#filedate`
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Set the gzip level of the output
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Aggregate `mafs` into `output` as a gzipped project-level MAF
    ///
    /// Nothing at all is written to `output` if `mafs` is empty or every
    /// input is skipped.
    ///
    /// # Errors
    ///
    /// - [`MafError::Validation`] on the first schema mismatch. Rows written
    ///   before the mismatch are not rolled back.
    /// - [`MafError::MissingPragma`], [`MafError::InvalidPragma`] or
    ///   [`MafError::MissingColumnHeaders`] for a malformed input.
    /// - [`MafError::Io`] for read, decode or write failures.
    pub fn aggregate<R: Read, W: Write>(
        &self,
        mafs: &mut [AliquotLevelMaf<R>],
        output: W,
    ) -> Result<AggregationSummary> {
        let compression = self.compression;
        self.aggregate_into(mafs, move || {
            Ok(CompressedWriter::new_gzip(output, compression)?)
        })
    }

    /// Aggregate into a [`DataSink`]
    ///
    /// Compression follows the sink (gzip for `.gz`/`.gzip` paths).
    /// The file is only created once the first non-empty input is reached.
    pub fn aggregate_to_sink<R: Read>(
        &self,
        mafs: &mut [AliquotLevelMaf<R>],
        sink: DataSink,
    ) -> Result<AggregationSummary> {
        let compression = self.compression;
        self.aggregate_into(mafs, move || {
            Ok(CompressedWriter::from_sink(sink, compression)?)
        })
    }

    fn aggregate_into<'w, R, F>(
        &self,
        mafs: &mut [AliquotLevelMaf<R>],
        open_output: F,
    ) -> Result<AggregationSummary>
    where
        R: Read,
        F: FnOnce() -> Result<CompressedWriter<'w>>,
    {
        let mut summary = AggregationSummary {
            inputs: mafs.len(),
            ..AggregationSummary::default()
        };

        if mafs.is_empty() {
            debug!("No aliquot-level MAFs given, nothing to aggregate");
            return Ok(summary);
        }

        let submitter_ids: Vec<String> = mafs
            .iter()
            .map(|maf| maf.tumor_aliquot_submitter_id.clone())
            .collect();

        let mut open_output = Some(open_output);
        let mut writer: Option<MafWriter<'w>> = None;
        let mut expected_file_header: Option<MafFileHeader> = None;
        let mut expected_columns: Option<ColumnHeaders> = None;

        for (index, maf) in mafs.iter_mut().enumerate() {
            let submitter_id = &submitter_ids[index];
            let mut reader = MafReader::new(CompressedReader::new(&mut maf.file)?);

            let Some(file_header) = reader.read_file_header()? else {
                warn!(index, submitter_id = %submitter_id, "Skipping empty or inaccessible MAF");
                summary.skipped += 1;
                continue;
            };

            let expected = expected_file_header.get_or_insert_with(|| file_header.clone());
            file_header.validate_against(expected)?;

            let columns = reader.read_column_headers()?;
            let expected = expected_columns.get_or_insert_with(|| columns.clone());
            columns.validate_against(expected)?;

            if writer.is_none() {
                let open = open_output.take().ok_or_else(|| MafError::InvalidInput {
                    msg: "Aggregation output already opened".to_string(),
                })?;
                let header = ProjectHeader {
                    version: file_header.version.clone(),
                    file_date: self.clock.today(),
                    annotation_spec: file_header.annotation_spec.clone(),
                    submitter_ids: submitter_ids.clone(),
                };
                let mut new_writer = MafWriter::new(open()?);
                new_writer.write_header(&header, &columns)?;
                writer = Some(new_writer);
            }

            if let Some(writer) = writer.as_mut() {
                let rows = writer.copy_rows_from(&mut reader)?;
                debug!(index, submitter_id = %submitter_id, rows, "Appended aliquot-level MAF");
            }
        }

        if let Some(writer) = writer {
            summary.rows_written = writer.rows_written();
            writer.finish()?;
        }

        info!(
            inputs = summary.inputs,
            skipped = summary.skipped,
            rows = summary.rows_written,
            "Aggregated aliquot-level MAFs"
        );
        Ok(summary)
    }
}

impl Default for MafAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate with the system clock and default compression
///
/// See [`MafAggregator::aggregate`].
pub fn aggregate_mafs<R: Read, W: Write>(
    mafs: &mut [AliquotLevelMaf<R>],
    output: W,
) -> Result<AggregationSummary> {
    MafAggregator::new().aggregate(mafs, output)
}
