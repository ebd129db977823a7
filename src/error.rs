//! Error types for tagreport.

use thiserror::Error;

/// Main error type for all tagreport operations.
#[derive(Debug, Error)]
pub enum TagReportError {
    /// I/O error while reading records or writing reports.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited record reader/writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error (tag record interchange).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A single textual record could not be turned into a tag.
    #[error("Malformed record: {0}")]
    Record(#[from] RecordError),

    /// The parameter encoder could not produce bytes for a tag.
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// A batch exceeds the PDU budget and the writer was told to reject it.
    #[error("Batch {index} carries a {size}-byte parameter over the PDU budget")]
    OversizedBatch {
        /// Position of the batch in its sequence.
        index: usize,
        /// Payload size of the batch.
        size: usize,
    },

    /// Protocol error (invalid message header, oversized message, etc.).
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Why one textual tag record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Record does not have exactly four fields.
    #[error("expected 4 fields, got {0}")]
    FieldCount(usize),

    /// Control bits are not a base-16 u16.
    #[error("invalid PC bits {0:?}")]
    ControlBits(String),

    /// Length is not a base-10 u16.
    #[error("invalid length {0:?}")]
    Length(String),

    /// EPC length is not a base-10 u16.
    #[error("invalid EPC length bits {0:?}")]
    EpcLengthBits(String),

    /// EPC is not an even-length hex string.
    #[error("invalid EPC {0:?}")]
    Epc(String),

    /// The row itself could not be read as delimited text.
    #[error("unreadable row: {0}")]
    Syntax(String),
}

/// Result type alias using TagReportError.
pub type Result<T> = std::result::Result<T, TagReportError>;
