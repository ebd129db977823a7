//! Writes report batches to a byte sink as `RO_ACCESS_REPORT` messages.
//!
//! Each batch becomes one message with its own id, numbered sequentially
//! from the configured start. Messages go out with scatter/gather I/O
//! (`write_vectored`), several per call, and partial writes are resumed.
//!
//! # Architecture
//!
//! ```text
//! BatchSequence ─► ReportWriter ─► [header|batch][header|batch]... ─► AsyncWrite
//! ```
//!
//! Oversized batches are the transport's call: see [`OversizePolicy`].

use std::io::IoSlice;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::batch::{BatchSequence, ReportBatch};
use crate::error::{Result, TagReportError};
use crate::protocol::{report_header, HEADER_SIZE};

/// Default id of the first message written.
pub const DEFAULT_FIRST_MESSAGE_ID: u32 = 1;

/// Maximum messages to gather into a single write operation.
const MAX_REPORTS_PER_WRITE: usize = 64;

/// What to do with a batch flagged as oversized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversizePolicy {
    /// Send it anyway.
    Send,
    /// Drop it with a warning and continue.
    Skip,
    /// Fail before writing it.
    #[default]
    Reject,
}

/// Configuration for the report writer.
#[derive(Debug, Clone)]
pub struct ReportWriterConfig {
    /// Message id for the first report.
    pub first_message_id: u32,
    /// Handling of oversized batches.
    pub oversize_policy: OversizePolicy,
}

impl Default for ReportWriterConfig {
    fn default() -> Self {
        Self {
            first_message_id: DEFAULT_FIRST_MESSAGE_ID,
            oversize_policy: OversizePolicy::default(),
        }
    }
}

/// Totals for one call to [`ReportWriter::write_sequence`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Messages written.
    pub messages: usize,
    /// Tags carried by the written messages.
    pub tags: usize,
    /// Oversized batches dropped under [`OversizePolicy::Skip`].
    pub skipped_batches: usize,
    /// Bytes written, headers included.
    pub bytes: usize,
}

/// A report ready to be written.
#[derive(Debug)]
struct OutboundReport {
    header: [u8; HEADER_SIZE],
    payload: Bytes,
}

impl OutboundReport {
    fn new(message_id: u32, batch: &ReportBatch) -> Result<Self> {
        let header = report_header(message_id, batch.len())?;
        Ok(Self {
            header: header.encode(),
            payload: batch.parameter_bytes(),
        })
    }

    #[inline]
    fn size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Writes batches as `RO_ACCESS_REPORT` messages.
pub struct ReportWriter<W> {
    writer: W,
    next_message_id: u32,
    oversize_policy: OversizePolicy,
}

impl<W> ReportWriter<W>
where
    W: AsyncWrite + Unpin,
{
    /// Wrap a byte sink.
    pub fn new(writer: W, config: ReportWriterConfig) -> Self {
        Self {
            writer,
            next_message_id: config.first_message_id,
            oversize_policy: config.oversize_policy,
        }
    }

    /// Wrap a byte sink with default configuration.
    pub fn with_defaults(writer: W) -> Self {
        Self::new(writer, ReportWriterConfig::default())
    }

    /// Id the next message will carry.
    #[inline]
    pub fn next_message_id(&self) -> u32 {
        self.next_message_id
    }

    /// Unwrap the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn take_message_id(&mut self) -> u32 {
        let id = self.next_message_id;
        self.next_message_id = self.next_message_id.wrapping_add(1);
        id
    }

    /// Write every batch in order.
    ///
    /// With [`OversizePolicy::Reject`] the sequence is checked before
    /// anything is written, so a rejected sequence leaves the sink untouched.
    ///
    /// # Errors
    ///
    /// Returns `OversizedBatch` under the reject policy, or an I/O error.
    pub async fn write_sequence(&mut self, batches: &BatchSequence) -> Result<WriteSummary> {
        if self.oversize_policy == OversizePolicy::Reject {
            if let Some((index, batch)) = batches.oversized().next() {
                return Err(TagReportError::OversizedBatch {
                    index,
                    size: batch.len(),
                });
            }
        }

        let mut summary = WriteSummary::default();
        let mut pending = Vec::with_capacity(MAX_REPORTS_PER_WRITE);

        for (index, batch) in batches.iter().enumerate() {
            if batch.is_oversized() && self.oversize_policy == OversizePolicy::Skip {
                tracing::warn!(
                    "Dropping oversized batch {} ({} bytes, {} tags)",
                    index,
                    batch.len(),
                    batch.tag_count()
                );
                summary.skipped_batches += 1;
                continue;
            }

            let message_id = self.take_message_id();
            let report = OutboundReport::new(message_id, batch)?;
            summary.messages += 1;
            summary.tags += batch.tag_count();
            summary.bytes += report.size();
            pending.push(report);

            if pending.len() == MAX_REPORTS_PER_WRITE {
                write_reports(&mut self.writer, &pending).await?;
                pending.clear();
            }
        }

        write_reports(&mut self.writer, &pending).await?;
        tracing::debug!(
            "Wrote {} reports carrying {} tags ({} bytes)",
            summary.messages,
            summary.tags,
            summary.bytes
        );
        Ok(summary)
    }

    /// Write a single batch as one message, regardless of policy.
    ///
    /// Returns the message id used.
    pub async fn write_batch(&mut self, batch: &ReportBatch) -> Result<u32> {
        let message_id = self.take_message_id();
        let report = OutboundReport::new(message_id, batch)?;
        write_reports(&mut self.writer, std::slice::from_ref(&report)).await?;
        Ok(message_id)
    }
}

/// Write reports using scatter/gather I/O (write_vectored).
async fn write_reports<W>(writer: &mut W, reports: &[OutboundReport]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if reports.is_empty() {
        return Ok(());
    }

    let total_size: usize = reports.iter().map(OutboundReport::size).sum();
    let mut total_written = 0;

    while total_written < total_size {
        let slices = build_remaining_slices(reports, total_written);
        let written = writer.write_vectored(&slices).await?;
        if written == 0 {
            return Err(TagReportError::Io(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "write_vectored returned 0",
            )));
        }
        total_written += written;
    }

    writer.flush().await?;
    Ok(())
}

/// Build IoSlice array for the data after the first `skip_bytes`.
fn build_remaining_slices(reports: &[OutboundReport], skip_bytes: usize) -> Vec<IoSlice<'_>> {
    let mut slices = Vec::with_capacity(reports.len() * 2);
    let mut offset = 0;

    for report in reports {
        let header_end = offset + HEADER_SIZE;
        if skip_bytes < header_end {
            let start = skip_bytes.saturating_sub(offset);
            slices.push(IoSlice::new(&report.header[start..]));
        }
        offset = header_end;

        if !report.payload.is_empty() {
            let payload_end = offset + report.payload.len();
            if skip_bytes < payload_end {
                let start = skip_bytes.saturating_sub(offset);
                slices.push(IoSlice::new(&report.payload[start..]));
            }
            offset = payload_end;
        }
    }

    slices
}
