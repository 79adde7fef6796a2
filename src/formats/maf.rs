//! MAF (Mutation Annotation Format) reading and header validation
//!
//! # Format
//!
//! ```text
//! #version gdc-1.0.0
//! #annotation.spec gdc-1.0.0-aliquot-merged-masked
//! #filedate 20200315
//! Hugo_Symbol  Entrez_Gene_Id  Center  ...
//! TP53         7157            BI      ...
//! ```
//!
//! - **Pragma block**: `#key value` lines, value is the remainder of the line
//! - **Column header**: one tab-delimited line right after the pragmas
//! - **Data rows**: tab-delimited, copied through untouched by aggregation
//!
//! A stream with no pragma lines at all is considered empty (or an
//! inaccessible, e.g. redacted, file) and yields no header.

use crate::error::{MafError, Result, ValidationError, ValidationKind};
use crate::formats::primitives::tab_delimited::{trim_line_end, TabDelimitedRecord};
use chrono::NaiveDate;
use std::fmt;
use std::io::{BufRead, Write};

/// Pragma key for the MAF format version
pub const VERSION_KEY: &str = "version";

/// Pragma key for the annotation specification
pub const ANNOTATION_SPEC_KEY: &str = "annotation.spec";

/// Parsed pragma block of a MAF file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MafFileHeader {
    /// `#version`
    pub version: String,
    /// `#annotation.spec`
    pub annotation_spec: String,
    /// All other pragmas, in encounter order
    pub properties: Vec<(String, String)>,
}

impl MafFileHeader {
    /// Build a header from `(key, value)` pragmas
    ///
    /// Returns `Ok(None)` for an empty pragma block.
    ///
    /// # Errors
    ///
    /// Returns [`MafError::MissingPragma`] if a non-empty block lacks
    /// `version` or `annotation.spec`.
    pub fn from_pragmas<I>(pragmas: I) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut seen_any = false;
        let mut version = None;
        let mut annotation_spec = None;
        let mut properties = Vec::new();

        for (key, value) in pragmas {
            seen_any = true;
            match key.as_str() {
                VERSION_KEY => version = Some(value),
                ANNOTATION_SPEC_KEY => annotation_spec = Some(value),
                _ => properties.push((key, value)),
            }
        }

        if !seen_any {
            return Ok(None);
        }

        let version = version
            .filter(|v| !v.is_empty())
            .ok_or(MafError::MissingPragma { key: VERSION_KEY })?;
        let annotation_spec = annotation_spec
            .filter(|v| !v.is_empty())
            .ok_or(MafError::MissingPragma {
                key: ANNOTATION_SPEC_KEY,
            })?;

        Ok(Some(Self {
            version,
            annotation_spec,
            properties,
        }))
    }

    /// Look up an auxiliary pragma by key
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check that `version` and `annotation.spec` match the reference header
    ///
    /// Both fields are compared before failing, so the error lists every
    /// mismatch.
    pub fn validate_against(&self, expected: &MafFileHeader) -> std::result::Result<(), ValidationError> {
        let mut errors = Vec::new();

        if self.version != expected.version {
            errors.push(format!(
                "All files must have the same version. File version {} does not match version {}",
                self.version, expected.version
            ));
        }

        if self.annotation_spec != expected.annotation_spec {
            errors.push(format!(
                "All files must have the same annotation spec. File annotation spec {} \
                 does not match annotation spec {}",
                self.annotation_spec, expected.annotation_spec
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(
                ValidationKind::FileHeader,
                "Failed file header validation.",
                errors.join("\n"),
            ))
        }
    }
}

/// Ordered column names from the MAF column header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnHeaders(Vec<String>);

impl ColumnHeaders {
    /// Create from column names
    pub fn new(columns: Vec<String>) -> Self {
        Self(columns)
    }

    /// Column names in file order
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no columns
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Require the exact same ordered columns as the reference file
    pub fn validate_against(&self, expected: &ColumnHeaders) -> std::result::Result<(), ValidationError> {
        if self == expected {
            return Ok(());
        }
        Err(ValidationError::new(
            ValidationKind::ColumnHeaders,
            "All files must have the same column headers.",
            format!("Got: {:?}\nExpected: {:?}", self.0, expected.0),
        ))
    }
}

impl TabDelimitedRecord for ColumnHeaders {
    fn from_line(line: &str) -> Result<Self> {
        Ok(Self(line.split('\t').map(str::to_string).collect()))
    }

    fn to_line(&self) -> String {
        self.0.join("\t")
    }
}

/// The five pragmas heading a project-level (aggregated) MAF file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectHeader {
    /// Shared `#version` of all inputs
    pub version: String,
    /// Date stamped into `#filedate`
    pub file_date: NaiveDate,
    /// Shared `#annotation.spec` of all inputs
    pub annotation_spec: String,
    /// Tumor aliquot submitter ids of every supplied input, in order
    pub submitter_ids: Vec<String>,
}

impl ProjectHeader {
    /// Number of analyzed samples (`#n.analyzed.samples`)
    pub fn n_analyzed_samples(&self) -> usize {
        self.submitter_ids.len()
    }

    /// Pragma lines without trailing newlines
    pub fn to_pragma_lines(&self) -> Vec<String> {
        vec![
            format!("#version {}", self.version),
            format!("#filedate {}", self.file_date.format("%Y%m%d")),
            format!("#annotation.spec {}", self.annotation_spec),
            format!("#n.analyzed.samples {}", self.n_analyzed_samples()),
            format!(
                "#tumor.aliquots.submitter_id {}",
                self.submitter_ids.join(",")
            ),
        ]
    }
}

impl fmt::Display for ProjectHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.to_pragma_lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Sequential reader over one decompressed MAF stream
///
/// Call [`read_file_header`](Self::read_file_header), then
/// [`read_column_headers`](Self::read_column_headers), then
/// [`copy_rows`](Self::copy_rows).
pub struct MafReader<R: BufRead> {
    reader: R,
    line_buf: String,
    line_number: usize,
}

impl<R: BufRead> MafReader<R> {
    /// Create a reader over decompressed text
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_buf: String::with_capacity(1024),
            line_number: 0,
        }
    }

    fn next_line(&mut self) -> Result<bool> {
        self.line_buf.clear();
        let n = self.reader.read_line(&mut self.line_buf)?;
        if n > 0 {
            self.line_number += 1;
        }
        Ok(n > 0)
    }

    fn at_pragma(&mut self) -> Result<bool> {
        Ok(self.reader.fill_buf()?.first() == Some(&b'#'))
    }

    /// Parse the leading `#key value` block
    ///
    /// Returns `Ok(None)` if the stream does not start with a pragma line.
    pub fn read_file_header(&mut self) -> Result<Option<MafFileHeader>> {
        let mut pragmas = Vec::new();

        while self.at_pragma()? {
            self.next_line()?;
            let pragma = trim_line_end(&self.line_buf[1..]);
            let (key, value) = pragma
                .split_once(' ')
                .ok_or_else(|| MafError::InvalidPragma {
                    line: self.line_number,
                    content: pragma.to_string(),
                })?;
            pragmas.push((key.to_string(), value.to_string()));
        }

        MafFileHeader::from_pragmas(pragmas)
    }

    /// Parse the column header line
    pub fn read_column_headers(&mut self) -> Result<ColumnHeaders> {
        if !self.next_line()? {
            return Err(MafError::MissingColumnHeaders);
        }
        ColumnHeaders::from_line(trim_line_end(&self.line_buf))
    }

    /// Copy every remaining line to `output` unchanged
    ///
    /// A final line without a terminator gets a `\n`, so rows from
    /// consecutive inputs never run together. Returns the number of rows.
    pub fn copy_rows<W: Write + ?Sized>(&mut self, output: &mut W) -> Result<usize> {
        let mut rows = 0;
        while self.next_line()? {
            if !self.line_buf.ends_with('\n') {
                self.line_buf.push('\n');
            }
            output.write_all(self.line_buf.as_bytes())?;
            rows += 1;
        }
        Ok(rows)
    }
}
