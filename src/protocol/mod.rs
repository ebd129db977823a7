//! Protocol module - LLRP parameters, message header, and report framing.
//!
//! This module implements the bytes that go on the wire:
//! - `TagReportData` / `EPCData` / `C1G2PC` parameter encoding
//! - 10-byte LLRP message header encoding/decoding
//! - `RO_ACCESS_REPORT` message building and stream reassembly

mod message;
pub mod parameter;
mod report;
mod report_buffer;

pub use message::{
    MessageHeader, DEFAULT_MAX_MESSAGE_SIZE, HEADER_SIZE, LLRP_VERSION, RO_ACCESS_REPORT,
};
pub use parameter::{LlrpEncoder, ParameterEncoder};
pub use report::{build_report, build_report_parts, report_header, Message};
pub use report_buffer::ReportBuffer;
