//! LLRP message header encoding and decoding.
//!
//! Implements the 10-byte message header:
//! ```text
//! ┌──────┬─────────┬──────────────┬──────────┬────────────┐
//! │ Rsvd │ Version │ Message Type │ Length   │ Message ID │
//! │ 3 bit│ 3 bit   │ 10 bit       │ uint32 BE│ uint32 BE  │
//! └──────┴─────────┴──────────────┴──────────┴────────────┘
//! ```
//!
//! `Length` counts the whole message, header included. All multi-byte
//! integers are Big Endian.

use crate::error::{Result, TagReportError};

/// Header size in bytes (fixed, exactly 10).
pub const HEADER_SIZE: usize = 10;

/// Protocol version carried in every header (LLRP 1.0.1).
pub const LLRP_VERSION: u8 = 1;

/// Message type of `RO_ACCESS_REPORT`.
pub const RO_ACCESS_REPORT: u16 = 61;

/// Default maximum message size accepted when reading (16 MB).
pub const DEFAULT_MAX_MESSAGE_SIZE: u32 = 16 * 1024 * 1024;

const VERSION_MASK: u8 = 0b111;
const TYPE_MASK: u16 = 0x03FF;

/// Decoded LLRP message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    /// Reserved bits, must be 0.
    pub reserved: u8,
    /// Protocol version (3 bits).
    pub version: u8,
    /// Message type (10 bits).
    pub message_type: u16,
    /// Total message length in bytes, header included.
    pub length: u32,
    /// Message identifier.
    pub message_id: u32,
}

impl MessageHeader {
    /// Create a version-1 header for a message carrying `payload_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns error if the total length does not fit in 32 bits.
    pub fn new(message_type: u16, message_id: u32, payload_len: usize) -> Result<Self> {
        let length = u32::try_from(HEADER_SIZE + payload_len).map_err(|_| {
            TagReportError::Protocol(format!("Payload of {} bytes is too large", payload_len))
        })?;
        Ok(Self {
            reserved: 0,
            version: LLRP_VERSION,
            message_type,
            length,
            message_id,
        })
    }

    /// Encode header to bytes (Big Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use tagreport::protocol::{MessageHeader, RO_ACCESS_REPORT};
    ///
    /// let header = MessageHeader::new(RO_ACCESS_REPORT, 7, 25).unwrap();
    /// let bytes = header.encode();
    /// assert_eq!(bytes.len(), 10);
    /// assert_eq!(&bytes[..2], &[0x04, 0x3D]);
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `HEADER_SIZE` (10 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= HEADER_SIZE);
        let type_word = (u16::from(self.reserved & 0b111) << 13)
            | (u16::from(self.version & VERSION_MASK) << 10)
            | (self.message_type & TYPE_MASK);
        buf[0..2].copy_from_slice(&type_word.to_be_bytes());
        buf[2..6].copy_from_slice(&self.length.to_be_bytes());
        buf[6..10].copy_from_slice(&self.message_id.to_be_bytes());
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Returns `None` if buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        let type_word = u16::from_be_bytes([buf[0], buf[1]]);
        Some(Self {
            reserved: (type_word >> 13) as u8,
            version: ((type_word >> 10) as u8) & VERSION_MASK,
            message_type: type_word & TYPE_MASK,
            length: u32::from_be_bytes([buf[2], buf[3], buf[4], buf[5]]),
            message_id: u32::from_be_bytes([buf[6], buf[7], buf[8], buf[9]]),
        })
    }

    /// Validate the header for protocol compliance.
    ///
    /// Checks:
    /// - Reserved bits are 0
    /// - Version is 1
    /// - Length covers at least the header and doesn't exceed max
    pub fn validate(&self, max_message_size: u32) -> Result<()> {
        if self.reserved != 0 {
            return Err(TagReportError::Protocol(
                "Reserved header bits must be 0".to_string(),
            ));
        }

        if self.version != LLRP_VERSION {
            return Err(TagReportError::Protocol(format!(
                "Unsupported LLRP version {}",
                self.version
            )));
        }

        if (self.length as usize) < HEADER_SIZE {
            return Err(TagReportError::Protocol(format!(
                "Message length {} is shorter than the header",
                self.length
            )));
        }

        if self.length > max_message_size {
            return Err(TagReportError::Protocol(format!(
                "Message size {} exceeds maximum {}",
                self.length, max_message_size
            )));
        }

        Ok(())
    }

    /// Number of payload bytes following the header.
    #[inline]
    pub fn payload_len(&self) -> usize {
        (self.length as usize).saturating_sub(HEADER_SIZE)
    }

    /// Check if this is an `RO_ACCESS_REPORT`.
    #[inline]
    pub fn is_ro_access_report(&self) -> bool {
        self.message_type == RO_ACCESS_REPORT
    }
}
