//! Plain-text FASTQ reading and writing.
//!
//! Parsing is delegated to `needletail`, which also transparently handles
//! gzip-compressed input. Records are converted to owned [`FastqRecord`]s so a
//! reader can be consumed lazily and dropped at any point.
//!
//! ### Errors
//! A record cut short by end-of-stream, a bad `+` separator or a
//! sequence/quality length mismatch ends the stream with a [`FastqError`].
//! After the first error the reader yields `None`.
//!
//! ### Example
//! ```no_run
//! use trimsense::fastq::FastqReader;
//! let reader = FastqReader::from_path("sample_1.fastq").unwrap();
//! for rec in reader {
//!     let rec = rec.unwrap();
//!     println!("{} {}", rec.header, rec.sequence.len());
//! }
//! ```
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use needletail::errors::ParseErrorKind;
use needletail::{parse_fastx_reader, FastxReader};

use crate::errors::FastqError;

/// One FASTQ record. `sequence` and `quality` always have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastqRecord {
    /// Header line without the leading `@`.
    pub header: String,
    pub sequence: String,
    pub quality: String,
}

/// Lazy, finite, non-restartable stream of [`FastqRecord`]s.
pub struct FastqReader {
    origin: String,
    inner: Option<Box<dyn FastxReader>>,
}

impl FastqReader {
    /// Open a FASTQ (or FASTQ.GZ) file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FastqError> {
        let p = path.as_ref();
        let origin = p.display().to_string();
        let file = File::open(p).map_err(|source| FastqError::Io { origin: origin.clone(), source })?;
        Self::with_origin(file, origin)
    }

    /// Wrap any byte stream.
    pub fn new<R: io::Read + Send + 'static>(reader: R) -> Result<Self, FastqError> {
        Self::with_origin(reader, "<stream>")
    }

    fn with_origin<R: io::Read + Send + 'static>(reader: R, origin: impl Into<String>) -> Result<Self, FastqError> {
        let origin = origin.into();
        let inner = match parse_fastx_reader(reader) {
            Ok(r) => Some(r),
            Err(e) if matches!(e.kind, ParseErrorKind::EmptyFile) => None,
            Err(source) => return Err(FastqError::Parse { origin, source }),
        };
        Ok(Self { origin, inner })
    }

    /// Path (or `<stream>`) this reader was opened on.
    pub fn origin(&self) -> &str { &self.origin }

    fn read_one(&mut self) -> Option<Result<FastqRecord, FastqError>> {
        let origin = &self.origin;
        let reader = self.inner.as_mut()?;
        let rec = match reader.next()? {
            Ok(rec) => rec,
            Err(source) => return Some(Err(FastqError::Parse { origin: origin.clone(), source })),
        };

        let header = String::from_utf8_lossy(rec.id()).into_owned();
        let sequence = String::from_utf8_lossy(&rec.seq()).into_owned();
        let Some(qual) = rec.qual() else {
            return Some(Err(FastqError::MissingQuality { origin: origin.clone(), header }));
        };
        let quality = String::from_utf8_lossy(qual).into_owned();
        if sequence.len() != quality.len() {
            return Some(Err(FastqError::LengthMismatch {
                origin: origin.clone(),
                seq_len: sequence.len(),
                qual_len: quality.len(),
                header,
            }));
        }
        Some(Ok(FastqRecord { header, sequence, quality }))
    }
}

impl Iterator for FastqReader {
    type Item = Result<FastqRecord, FastqError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.read_one()?;
        if item.is_err() {
            self.inner = None;
        }
        Some(item)
    }
}

/// Write a record in the canonical 4-line layout.
pub fn write_record<W: Write>(w: &mut W, rec: &FastqRecord) -> io::Result<()> {
    w.write_all(b"@")?;
    w.write_all(rec.header.as_bytes())?;
    w.write_all(b"\n")?;
    w.write_all(rec.sequence.as_bytes())?;
    w.write_all(b"\n+\n")?;
    w.write_all(rec.quality.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}
