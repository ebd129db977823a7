//! Virtual tag entity and collection queries.
//!
//! A [`Tag`] carries the four fields an LLRP `TagReportData` needs:
//! PC bits, the declared `EPCData` length, the EPC bit length, and the EPC
//! itself. Identity comes in two strengths:
//!
//! - `==` compares all four fields (byte-exact EPC)
//! - [`Tag::is_duplicate`] compares the EPC only
//!
//! # Example
//!
//! ```
//! use tagreport::tag::{index_of, Tag};
//!
//! let a = Tag::new(0x3000, 18, 96, vec![0xE2, 0x00, 0x68, 0x94]);
//! let b = Tag::new(0x3400, 22, 96, vec![0xE2, 0x00, 0x68, 0x94]);
//!
//! assert_ne!(a, b);
//! assert!(a.is_duplicate(&b));
//! assert_eq!(index_of(&[a.clone()], &b), Some(0));
//! assert_eq!(a.to_string(), "3000,18,96,e2006894");
//! ```

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::codec::record::parse_fields;
use crate::error::RecordError;

/// A single virtual tag.
///
/// Immutable once built; fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pc_bits: u16,
    length: u16,
    epc_length_bits: u16,
    epc: Bytes,
}

impl Tag {
    /// Create a new tag.
    ///
    /// `epc.len()` is not checked against `epc_length_bits`; a mismatch is
    /// carried through to the encoded parameter as given.
    pub fn new(pc_bits: u16, length: u16, epc_length_bits: u16, epc: impl Into<Bytes>) -> Self {
        Self {
            pc_bits,
            length,
            epc_length_bits,
            epc: epc.into(),
        }
    }

    /// Protocol control bits (C1G2 PC word).
    #[inline]
    pub fn pc_bits(&self) -> u16 {
        self.pc_bits
    }

    /// Declared `EPCData` parameter length.
    #[inline]
    pub fn length(&self) -> u16 {
        self.length
    }

    /// EPC length in bits.
    #[inline]
    pub fn epc_length_bits(&self) -> u16 {
        self.epc_length_bits
    }

    /// EPC bytes.
    #[inline]
    pub fn epc(&self) -> &[u8] {
        &self.epc
    }

    /// Check whether `other` carries the same EPC, ignoring every other field.
    #[inline]
    pub fn is_duplicate(&self, other: &Tag) -> bool {
        self.epc == other.epc
    }

    /// Project the tag into its all-string interchange form.
    pub fn to_record(&self) -> TagRecord {
        TagRecord {
            pc_bits: format!("{:x}", self.pc_bits),
            length: self.length.to_string(),
            epc_length_bits: self.epc_length_bits.to_string(),
            epc: hex::encode(&self.epc),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:x},{},{},{}",
            self.pc_bits,
            self.length,
            self.epc_length_bits,
            hex::encode(&self.epc)
        )
    }
}

/// String projection of a [`Tag`].
///
/// PC bits are base-16, the two lengths base-10, and the EPC lowercase hex.
/// JSON keys match the field names used by existing tag files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    /// PC bits, base-16.
    #[serde(rename = "PCBits")]
    pub pc_bits: String,
    /// Length, base-10.
    #[serde(rename = "Length")]
    pub length: String,
    /// EPC length in bits, base-10.
    #[serde(rename = "EPCLengthBits")]
    pub epc_length_bits: String,
    /// EPC, hex.
    #[serde(rename = "EPC")]
    pub epc: String,
}

impl TagRecord {
    /// Fields in column order.
    pub fn fields(&self) -> [&str; 4] {
        [&self.pc_bits, &self.length, &self.epc_length_bits, &self.epc]
    }

    /// Parse the record back into a tag.
    pub fn to_tag(&self) -> std::result::Result<Tag, RecordError> {
        parse_fields(&self.fields())
    }
}

impl From<&Tag> for TagRecord {
    fn from(tag: &Tag) -> Self {
        tag.to_record()
    }
}

/// Position of the first tag in `tags` that is a duplicate of `target`.
///
/// Returns `None` when no tag shares the target's EPC.
pub fn index_of(tags: &[Tag], target: &Tag) -> Option<usize> {
    tags.iter().position(|tag| tag.is_duplicate(target))
}

/// Drop later tags whose EPC already appeared, keeping input order.
pub fn dedup(tags: &[Tag]) -> Vec<Tag> {
    let mut unique: Vec<Tag> = Vec::with_capacity(tags.len());
    for tag in tags {
        if index_of(&unique, tag).is_none() {
            unique.push(tag.clone());
        }
    }
    unique
}
