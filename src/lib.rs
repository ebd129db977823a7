//! # tagreport
//!
//! Virtual RFID tag collections packed into size-bounded LLRP report batches.
//!
//! Tags are encoded as `TagReportData` parameters and folded, in order, into
//! batches that each fit a fixed PDU budget once transport framing is
//! accounted for. Batches can then be written out as `RO_ACCESS_REPORT`
//! messages.
//!
//! ## Architecture
//!
//! - **Records** (`codec`): CSV and JSON tag files, lenient per-row parsing
//! - **Tags** (`tag`): identity, duplicate detection, index lookup
//! - **Batching** (`batch`): greedy order-preserving fold under a PDU budget
//! - **Wire** (`protocol`, `writer`): LLRP parameters, message framing, async writer
//!
//! ## Example
//!
//! ```
//! use tagreport::batch::{BatcherConfig, ReportBatcher};
//! use tagreport::codec::csv::read_tags;
//!
//! let input = "3000,18,96,300833b2ddd9014000000001\n\
//!              3000,18,96,300833b2ddd9014000000002\n";
//! let tags = read_tags(input.as_bytes()).unwrap();
//!
//! let batcher = ReportBatcher::new(BatcherConfig::new(1500));
//! let batches = batcher.batch(&tags).unwrap();
//! assert_eq!(batches.len(), 1);
//! assert_eq!(batches.total_tag_count(), 2);
//! ```

pub mod batch;
pub mod codec;
pub mod error;
pub mod protocol;
pub mod tag;
pub mod writer;

pub use batch::{BatchSequence, BatcherConfig, ReportBatch, ReportBatcher};
pub use error::{RecordError, Result, TagReportError};
pub use tag::{Tag, TagRecord};
pub use writer::{OversizePolicy, ReportWriter, ReportWriterConfig};
