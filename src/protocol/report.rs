//! `RO_ACCESS_REPORT` messages.
//!
//! A report message is a [`MessageHeader`] followed by the concatenated
//! `TagReportData` parameters of one batch. Uses `bytes::Bytes` for
//! zero-copy payload sharing.
//!
//! # Example
//!
//! ```
//! use tagreport::protocol::{build_report, Message, MessageHeader, HEADER_SIZE};
//!
//! let bytes = build_report(7, b"params").unwrap();
//! assert_eq!(bytes.len(), HEADER_SIZE + 6);
//!
//! let header = MessageHeader::decode(&bytes).unwrap();
//! assert!(header.is_ro_access_report());
//! assert_eq!(header.message_id, 7);
//! ```

use bytes::Bytes;

use super::message::{MessageHeader, HEADER_SIZE, RO_ACCESS_REPORT};
use crate::error::Result;

/// A complete LLRP message.
#[derive(Debug, Clone)]
pub struct Message {
    /// Decoded header.
    pub header: MessageHeader,
    /// Payload bytes (zero-copy via `bytes::Bytes`).
    pub payload: Bytes,
}

impl Message {
    /// Create a new message from header and payload.
    pub fn new(header: MessageHeader, payload: Bytes) -> Self {
        Self { header, payload }
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get the message ID.
    #[inline]
    pub fn message_id(&self) -> u32 {
        self.header.message_id
    }

    /// Get the message type.
    #[inline]
    pub fn message_type(&self) -> u16 {
        self.header.message_type
    }

    /// Check if this is an `RO_ACCESS_REPORT`.
    #[inline]
    pub fn is_ro_access_report(&self) -> bool {
        self.header.is_ro_access_report()
    }
}

/// Header for an `RO_ACCESS_REPORT` carrying `payload_len` bytes.
#[inline]
pub fn report_header(message_id: u32, payload_len: usize) -> Result<MessageHeader> {
    MessageHeader::new(RO_ACCESS_REPORT, message_id, payload_len)
}

/// Build a complete `RO_ACCESS_REPORT` as a single byte vector.
///
/// Use `build_report_parts` for scatter/gather I/O (writev).
pub fn build_report(message_id: u32, payload: &[u8]) -> Result<Vec<u8>> {
    let header = report_header(message_id, payload.len())?;
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Build report parts for scatter/gather I/O.
///
/// Returns the encoded header and a reference to the payload.
pub fn build_report_parts(message_id: u32, payload: &[u8]) -> Result<([u8; HEADER_SIZE], &[u8])> {
    let header = report_header(message_id, payload.len())?;
    Ok((header.encode(), payload))
}
