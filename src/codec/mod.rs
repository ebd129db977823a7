//! Codec module - textual interchange for tag collections.
//!
//! - [`record`] - Four-field record parsing and formatting
//! - [`csv`] - Delimited tag files (lenient read, per-row write reporting)
//! - [`JsonCodec`] - JSON arrays of [`TagRecord`](crate::tag::TagRecord)
//!
//! Byte-level protocol encoding lives in [`protocol`](crate::protocol).

pub mod csv;
mod json;
pub mod record;

pub use json::JsonCodec;
pub use record::{parse_fields, RecordOutcome};
