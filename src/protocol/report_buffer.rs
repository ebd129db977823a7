//! Buffer for splitting a received byte stream into LLRP messages.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! Implements a state machine for handling fragmented messages:
//! - `WaitingForHeader`: Need at least 10 bytes
//! - `WaitingForPayload`: Header parsed, need N more payload bytes

use bytes::{Bytes, BytesMut};

use super::message::{MessageHeader, DEFAULT_MAX_MESSAGE_SIZE, HEADER_SIZE};
use super::Message;
use crate::error::{Result, TagReportError};

/// State machine for message parsing.
#[derive(Debug, Clone)]
enum State {
    /// Waiting for complete header (need 10 bytes).
    WaitingForHeader,
    /// Header parsed, waiting for payload bytes.
    WaitingForPayload {
        header: MessageHeader,
        remaining: usize,
    },
}

/// Accumulates incoming bytes and extracts complete messages.
pub struct ReportBuffer {
    buffer: BytesMut,
    state: State,
    max_message_size: u32,
}

impl ReportBuffer {
    /// Create a new buffer with the default max message size (16 MB).
    pub fn new() -> Self {
        Self::with_max_message_size(DEFAULT_MAX_MESSAGE_SIZE)
    }

    /// Create a new buffer with custom max message size.
    pub fn with_max_message_size(max_message_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(16 * 1024),
            state: State::WaitingForHeader,
            max_message_size,
        }
    }

    /// Push data into the buffer and extract all complete messages.
    ///
    /// Partial data is kept for the next push.
    ///
    /// # Errors
    ///
    /// Returns error if a header fails validation (reserved bits, version,
    /// length out of range).
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Message>> {
        self.buffer.extend_from_slice(data);

        let mut messages = Vec::new();
        while let Some(message) = self.try_extract_one()? {
            messages.push(message);
        }
        Ok(messages)
    }

    fn try_extract_one(&mut self) -> Result<Option<Message>> {
        match &self.state {
            State::WaitingForHeader => {
                let header = match MessageHeader::decode(&self.buffer) {
                    Some(header) => header,
                    None => return Ok(None),
                };
                header.validate(self.max_message_size)?;

                let _ = self.buffer.split_to(HEADER_SIZE);

                if header.payload_len() == 0 {
                    return Ok(Some(Message::new(header, Bytes::new())));
                }

                self.state = State::WaitingForPayload {
                    header,
                    remaining: header.payload_len(),
                };
                self.try_extract_one()
            }

            State::WaitingForPayload { header, remaining } => {
                let remaining = *remaining;
                if self.buffer.len() < remaining {
                    return Ok(None);
                }

                let payload = self.buffer.split_to(remaining).freeze();
                let header = *header;
                self.state = State::WaitingForHeader;

                Ok(Some(Message::new(header, payload)))
            }
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Check whether a message is partially received.
    pub fn has_partial(&self) -> bool {
        !self.buffer.is_empty() || matches!(self.state, State::WaitingForPayload { .. })
    }

    /// Drain all complete messages and fail if anything is left over.
    ///
    /// # Errors
    ///
    /// Returns error if the stream ended inside a message.
    pub fn finish(mut self) -> Result<Vec<Message>> {
        let messages = self.push(&[])?;
        if self.has_partial() {
            return Err(TagReportError::Protocol(format!(
                "Stream ended with {} bytes of an incomplete message",
                self.buffer.len()
            )));
        }
        Ok(messages)
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForHeader;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match &self.state {
            State::WaitingForHeader => "WaitingForHeader",
            State::WaitingForPayload { .. } => "WaitingForPayload",
        }
    }
}

impl Default for ReportBuffer {
    fn default() -> Self {
        Self::new()
    }
}
