//! JSON codec for tag records.
//!
//! Tags travel as arrays of [`TagRecord`] objects keyed `PCBits`, `Length`,
//! `EPCLengthBits` and `EPC`, all string-valued:
//!
//! ```json
//! [{"PCBits":"3000","Length":"18","EPCLengthBits":"96","EPC":"e200..."}]
//! ```
//!
//! # Example
//!
//! ```
//! use tagreport::codec::JsonCodec;
//! use tagreport::tag::Tag;
//!
//! let tags = vec![Tag::new(0x3000, 18, 96, vec![0xE2, 0x00])];
//! let json = JsonCodec::encode_tags(&tags).unwrap();
//! assert!(json.contains("\"PCBits\":\"3000\""));
//!
//! let decoded = JsonCodec::decode_tags(&json).unwrap();
//! assert_eq!(decoded, tags);
//! ```

use crate::error::Result;
use crate::tag::{Tag, TagRecord};

/// JSON codec for tag collections.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode tags as a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn encode_tags(tags: &[Tag]) -> Result<String> {
        let records: Vec<TagRecord> = tags.iter().map(Tag::to_record).collect();
        Ok(serde_json::to_string(&records)?)
    }

    /// Decode a JSON array of records.
    ///
    /// Unlike the delimited reader this is strict: the first record that
    /// does not parse fails the whole decode.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is invalid or any record is malformed.
    pub fn decode_tags(json: &str) -> Result<Vec<Tag>> {
        let records: Vec<TagRecord> = serde_json::from_str(json)?;
        records
            .iter()
            .map(|record| record.to_tag().map_err(Into::into))
            .collect()
    }

    /// Decode raw records without parsing them into tags.
    pub fn decode_records(json: &str) -> Result<Vec<TagRecord>> {
        Ok(serde_json::from_str(json)?)
    }
}
