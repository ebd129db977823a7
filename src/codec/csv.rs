//! Delimited-text tag files.
//!
//! Reading is forgiving: a row that does not parse is logged and skipped,
//! only an I/O failure of the underlying reader stops the read. Writing is
//! forgiving the same way: a row that fails to write or flush is recorded in
//! the returned [`WriteReport`] and the remaining rows are still written.
//!
//! # Example
//!
//! ```
//! use tagreport::codec::csv::{read_tags, write_tags};
//!
//! let input = "3000,18,96,e20034120000000000000001\n1A,10\n3000,18,96,e20034120000000000000002\n";
//! let tags = read_tags(input.as_bytes()).unwrap();
//! assert_eq!(tags.len(), 2);
//!
//! let mut out = Vec::new();
//! let report = write_tags(&mut out, &tags);
//! assert!(report.is_complete());
//! assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
//! ```

use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder, WriterBuilder};

use super::record::{format_fields, parse_fields, RecordOutcome};
use crate::error::{RecordError, Result, TagReportError};
use crate::tag::Tag;

/// Pulls tag records one at a time from a delimited source.
pub struct TagReader<R: io::Read> {
    inner: csv::Reader<R>,
    row: ByteRecord,
}

impl<R: io::Read> TagReader<R> {
    /// Wrap a reader. The source has no header row.
    pub fn new(reader: R) -> Self {
        let inner = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        Self {
            inner,
            row: ByteRecord::new(),
        }
    }

    /// Read the next record.
    ///
    /// # Errors
    ///
    /// Returns error only if the underlying reader fails.
    pub fn next_record(&mut self) -> Result<RecordOutcome> {
        match self.inner.read_byte_record(&mut self.row) {
            Ok(false) => Ok(RecordOutcome::EndOfInput),
            Ok(true) => Ok(match decode_row(&self.row) {
                Ok(tag) => RecordOutcome::Tag(tag),
                Err(e) => RecordOutcome::Malformed(e),
            }),
            Err(e) if e.is_io_error() => Err(e.into()),
            Err(e) => Ok(RecordOutcome::Malformed(RecordError::Syntax(e.to_string()))),
        }
    }

    /// Line number of the most recently read row.
    pub fn line(&self) -> u64 {
        self.row.position().map(|p| p.line()).unwrap_or(0)
    }
}

fn decode_row(row: &ByteRecord) -> std::result::Result<Tag, RecordError> {
    let fields = row
        .iter()
        .map(std::str::from_utf8)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| RecordError::Syntax(e.to_string()))?;
    parse_fields(&fields)
}

/// Read every well-formed tag from `reader`, skipping malformed rows.
///
/// # Errors
///
/// Returns error if the underlying reader fails.
pub fn read_tags<R: io::Read>(reader: R) -> Result<Vec<Tag>> {
    let mut records = TagReader::new(reader);
    let mut tags = Vec::new();
    let mut skipped = 0usize;

    loop {
        match records.next_record()? {
            RecordOutcome::Tag(tag) => tags.push(tag),
            RecordOutcome::Malformed(e) => {
                skipped += 1;
                tracing::warn!("Skipping tag record on line {}: {}", records.line(), e);
            }
            RecordOutcome::EndOfInput => break,
        }
    }

    tracing::debug!("Loaded {} tags ({} rows skipped)", tags.len(), skipped);
    Ok(tags)
}

/// Read tags from a file on disk.
pub fn load_tags(path: impl AsRef<Path>) -> Result<Vec<Tag>> {
    read_tags(File::open(path)?)
}

/// One row that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordWriteFailure {
    /// Index of the tag in the input slice.
    pub index: usize,
    /// Rendered error.
    pub error: String,
}

/// Outcome of writing a tag file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Rows written and flushed.
    pub written: usize,
    /// Rows that failed, in input order.
    pub failures: Vec<RecordWriteFailure>,
}

impl WriteReport {
    /// True if every row was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Render one tag as a complete CSV row.
fn encode_row(tag: &Tag) -> Result<Vec<u8>> {
    let mut row = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    row.write_record(format_fields(tag))?;
    row.into_inner().map_err(|e| TagReportError::Io(e.into_error()))
}

fn write_row<W: io::Write>(writer: &mut W, tag: &Tag) -> Result<()> {
    let row = encode_row(tag)?;
    writer.write_all(&row)?;
    writer.flush()?;
    Ok(())
}

/// Write one row per tag, in order, flushing after each row.
///
/// A row that fails is not retried or replayed by later rows.
pub fn write_tags<W: io::Write>(mut writer: W, tags: &[Tag]) -> WriteReport {
    let mut report = WriteReport::default();

    for (index, tag) in tags.iter().enumerate() {
        match write_row(&mut writer, tag) {
            Ok(()) => report.written += 1,
            Err(e) => {
                tracing::error!("Writing tag {} to csv: {}", index, e);
                report.failures.push(RecordWriteFailure {
                    index,
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

/// Create (or truncate) `path` and write the tags into it.
///
/// # Errors
///
/// Returns error if the file cannot be created. Per-row failures are in the
/// returned report.
pub fn persist_tags(path: impl AsRef<Path>, tags: &[Tag]) -> Result<WriteReport> {
    let file = File::create(path)?;
    Ok(write_tags(file, tags))
}
