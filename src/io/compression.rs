//! Compression layer shared by the MAF reader and writer
//!
//! Aliquot-level MAF files are distributed gzipped, but the reader does not
//! trust file extensions: it peeks at the first two bytes of the stream and
//! only decodes when the gzip magic (`1f 8b`) is present. Everything else is
//! passed through as plain text.
//!
//! Gzip decoding uses [`MultiGzDecoder`], so concatenated members (including
//! BGZF files, which are a series of small gzip members) are read to the end
//! instead of stopping after the first member.
//!
//! # Example
//!
//! ```
//! use aliquot_maf::io::compression::{CompressedReader, CompressedWriter};
//! use std::io::{BufRead, Write};
//!
//! # fn main() -> std::io::Result<()> {
//! let mut buffer = Vec::new();
//! let mut writer = CompressedWriter::new_gzip(&mut buffer, flate2::Compression::default())?;
//! writer.write_all(b"#version gdc-1.0.0\n")?;
//! writer.finish()?;
//!
//! let reader = CompressedReader::new(buffer.as_slice())?;
//! let lines: Vec<String> = reader.lines().collect::<std::io::Result<_>>()?;
//! assert_eq!(lines, vec!["#version gdc-1.0.0"]);
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::io::DataSink;
use flate2::bufread::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Gzip magic bytes (RFC 1952)
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Input location for file-based aggregation
#[derive(Debug, Clone)]
pub enum DataSource {
    /// Local file path
    Local(PathBuf),
}

impl DataSource {
    /// Create a local file data source
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        DataSource::Local(path.as_ref().to_path_buf())
    }

    /// Open the data source for reading
    pub fn open(&self) -> Result<File> {
        match self {
            DataSource::Local(path) => Ok(File::open(path)?),
        }
    }
}

/// Reader that transparently decompresses gzip input
///
/// Implements [`BufRead`], so it can be handed straight to a line-oriented
/// parser such as [`MafReader`](crate::formats::maf::MafReader).
pub struct CompressedReader<'a> {
    inner: Box<dyn BufRead + 'a>,
}

impl<'a> CompressedReader<'a> {
    /// Wrap a raw byte stream, detecting gzip from its magic bytes
    ///
    /// An empty stream is treated as plain (and empty) text. Short reads
    /// (pipes, sockets) are retried until both magic bytes are in hand.
    pub fn new<R: Read + 'a>(mut reader: R) -> io::Result<Self> {
        let mut magic = [0u8; 2];
        let filled = read_prefix(&mut reader, &mut magic)?;

        // Put the sniffed bytes back in front of the stream
        let stream = BufReader::new(io::Cursor::new(magic[..filled].to_vec()).chain(reader));

        if magic[..filled] == GZIP_MAGIC {
            Ok(Self {
                inner: Box::new(BufReader::new(MultiGzDecoder::new(stream))),
            })
        } else {
            Ok(Self {
                inner: Box::new(stream),
            })
        }
    }

    /// Open a [`DataSource`] and wrap it
    pub fn from_source(source: &DataSource) -> Result<CompressedReader<'static>> {
        let file = source.open()?;
        Ok(CompressedReader::new(file)?)
    }
}

/// Fill `buf` from `reader`, stopping early only at EOF
fn read_prefix<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl Read for CompressedReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for CompressedReader<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

/// Writer with optional gzip compression
///
/// Call [`finish`](CompressedWriter::finish) to write the gzip trailer and
/// surface any I/O error. Dropping an unfinished writer makes a best-effort
/// flush only.
pub enum CompressedWriter<'a> {
    /// Uncompressed writer with buffering
    Plain(Option<BufWriter<Box<dyn Write + 'a>>>),

    /// Gzip compressed writer
    Gzip(Option<GzEncoder<BufWriter<Box<dyn Write + 'a>>>>),
}

impl<'a> CompressedWriter<'a> {
    /// Create a writer for a [`DataSink`]
    ///
    /// Compression is detected from the sink's file extension
    /// (`.gz`, `.gzip`). Stdout is always uncompressed.
    pub fn new(sink: DataSink) -> io::Result<CompressedWriter<'static>> {
        CompressedWriter::from_sink(sink, Compression::default())
    }

    /// Create a writer for a [`DataSink`] with an explicit gzip level
    ///
    /// The level only applies when the sink is compressed.
    pub fn from_sink(sink: DataSink, level: Compression) -> io::Result<CompressedWriter<'static>> {
        let compressed = sink.is_compressed();
        match sink {
            DataSink::Local(path) => {
                let file = File::create(&path)?;
                if compressed {
                    CompressedWriter::new_gzip(file, level)
                } else {
                    CompressedWriter::new_plain(file)
                }
            }
            DataSink::Stdout => CompressedWriter::new_plain(io::stdout()),
        }
    }

    /// Create a plain (uncompressed) writer
    pub fn new_plain<W: Write + 'a>(writer: W) -> io::Result<Self> {
        let writer: Box<dyn Write + 'a> = Box::new(writer);
        Ok(Self::Plain(Some(BufWriter::new(writer))))
    }

    /// Create a gzip compressed writer
    pub fn new_gzip<W: Write + 'a>(writer: W, level: Compression) -> io::Result<Self> {
        let writer: Box<dyn Write + 'a> = Box::new(writer);
        Ok(Self::Gzip(Some(GzEncoder::new(BufWriter::new(writer), level))))
    }

    /// Whether output is gzip compressed
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Gzip(_))
    }

    /// Flush buffered data without finalizing the gzip stream
    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(Some(w)) => w.flush(),
            Self::Gzip(Some(w)) => w.flush(),
            _ => Ok(()),
        }
    }

    /// Finalize the stream and flush everything to the underlying writer
    pub fn finish(mut self) -> io::Result<()> {
        match &mut self {
            Self::Plain(w) => match w.take() {
                Some(mut writer) => writer.flush(),
                None => Ok(()),
            },
            Self::Gzip(w) => match w.take() {
                Some(encoder) => encoder.finish()?.flush(),
                None => Ok(()),
            },
        }
    }
}

impl Write for CompressedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(Some(w)) => w.write(buf),
            Self::Gzip(Some(w)) => w.write(buf),
            _ => Err(io::Error::new(
                io::ErrorKind::Other,
                "Cannot write to finished writer",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        CompressedWriter::flush(self)
    }
}

impl Drop for CompressedWriter<'_> {
    fn drop(&mut self) {
        // Best-effort; finish() reports errors
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_reader_detects_gzip() {
        let compressed = gzip(b"line 1\nline 2\n");
        let mut reader = CompressedReader::new(compressed.as_slice()).unwrap();

        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();
        assert_eq!(content, "line 1\nline 2\n");
    }

    /// Hands out one byte per `read` call, like a slow pipe
    struct OneByteReader<'a>(&'a [u8]);

    impl Read for OneByteReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match (self.0.split_first(), buf.first_mut()) {
                (Some((byte, rest)), Some(slot)) => {
                    *slot = *byte;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn test_reader_detects_gzip_on_short_reads() {
        let compressed = gzip(b"#version v1\nA\tB\n");
        let mut reader = CompressedReader::new(OneByteReader(&compressed)).unwrap();

        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();
        assert_eq!(content, "#version v1\nA\tB\n");
    }

    #[test]
    fn test_reader_short_reads_keep_plain_prefix() {
        let mut reader = CompressedReader::new(OneByteReader(b"#version v1\n")).unwrap();
        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();
        assert_eq!(content, "#version v1\n");

        let mut reader = CompressedReader::new(OneByteReader(b"#")).unwrap();
        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();
        assert_eq!(content, "#");
    }

    #[test]
    fn test_reader_passes_plain_text_through() {
        let mut reader = CompressedReader::new(&b"#version 1\nA\tB\n"[..]).unwrap();

        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();
        assert_eq!(content, "#version 1\nA\tB\n");
    }

    #[test]
    fn test_reader_empty_stream() {
        let mut reader = CompressedReader::new(&b""[..]).unwrap();
        let mut content = Vec::new();
        reader.read_to_end(&mut content).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn test_reader_multi_member_gzip() {
        let mut data = gzip(b"first member\n");
        data.extend(gzip(b"second member\n"));

        let reader = CompressedReader::new(data.as_slice()).unwrap();
        let lines: Vec<String> = reader.lines().collect::<io::Result<_>>().unwrap();
        assert_eq!(lines, vec!["first member", "second member"]);
    }

    #[test]
    fn test_writer_gzip_round_trip() {
        let mut buffer = Vec::new();
        {
            let mut writer = CompressedWriter::new_gzip(&mut buffer, Compression::fast()).unwrap();
            assert!(writer.is_compressed());
            for i in 0..1_000 {
                writeln!(writer, "Line {}", i).unwrap();
            }
            writer.finish().unwrap();
        }

        assert_eq!(&buffer[..2], &GZIP_MAGIC);

        let reader = CompressedReader::new(buffer.as_slice()).unwrap();
        assert_eq!(reader.lines().count(), 1_000);
    }

    #[test]
    fn test_writer_plain() {
        let mut buffer = Vec::new();
        {
            let mut writer = CompressedWriter::new_plain(&mut buffer).unwrap();
            assert!(!writer.is_compressed());
            writer.write_all(b"Hello\n").unwrap();
            writer.flush().unwrap();
            writer.write_all(b"World\n").unwrap();
            writer.finish().unwrap();
        }
        assert_eq!(buffer, b"Hello\nWorld\n");
    }

    #[test]
    fn test_writer_from_sink_detects_extension() {
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let gz_path = dir.path().join("out.maf.gz");
        let plain_path = dir.path().join("out.maf");

        for path in [&gz_path, &plain_path] {
            let mut writer = CompressedWriter::new(DataSink::from_path(path)).unwrap();
            writer.write_all(b"content\n").unwrap();
            writer.finish().unwrap();
        }

        let gz_bytes = std::fs::read(&gz_path).unwrap();
        assert_eq!(&gz_bytes[..2], &GZIP_MAGIC);
        assert_eq!(std::fs::read(&plain_path).unwrap(), b"content\n");

        let mut reader = CompressedReader::from_source(&DataSource::from_path(&gz_path)).unwrap();
        let mut content = String::new();
        reader.read_to_string(&mut content).unwrap();
        assert_eq!(content, "content\n");
    }
}
