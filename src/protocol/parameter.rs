//! LLRP parameter encoding for tag reports.
//!
//! One tag becomes one `TagReportData` parameter wrapping an `EPCData`
//! parameter and a `C1G2PC` air-protocol parameter:
//!
//! ```text
//! TagReportData (TLV 240)
//! ┌────────────┬──────────┬─────────────────────────────┬──────────────┐
//! │ Rsvd+Type  │ Length   │ EPCData (TLV 241)           │ C1G2PC (TV)  │
//! │ uint16 BE  │ uint16 BE│ type│len│epc bits│epc bytes │ 0x8C│pc bits │
//! └────────────┴──────────┴─────────────────────────────┴──────────────┘
//! ```
//!
//! All multi-byte integers are Big Endian. The `EPCData` length field is the
//! tag's declared length, written verbatim.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Result, TagReportError};
use crate::tag::Tag;

/// TLV type of `TagReportData`.
pub const TAG_REPORT_DATA_TYPE: u16 = 240;

/// TLV type of `EPCData`.
pub const EPC_DATA_TYPE: u16 = 241;

/// TV type of `C1G2PC`.
pub const C1G2_PC_TYPE: u8 = 12;

/// TLV header size: type (2 bytes) + length (2 bytes).
pub const TLV_HEADER_SIZE: usize = 4;

/// Encoded size of a `C1G2PC` parameter.
pub const C1G2_PC_SIZE: usize = 3;

/// Size of `EPCData` for an EPC of `epc_len` bytes.
#[inline]
pub fn epc_data_size(epc_len: usize) -> usize {
    TLV_HEADER_SIZE + 2 + epc_len
}

/// Encode an `EPCData` parameter.
pub fn epc_data(length: u16, epc_length_bits: u16, epc: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(epc_data_size(epc.len()));
    buf.put_u16(EPC_DATA_TYPE);
    buf.put_u16(length);
    buf.put_u16(epc_length_bits);
    buf.put_slice(epc);
    buf.freeze()
}

/// Encode a `C1G2PC` parameter.
#[inline]
pub fn c1g2_pc(pc_bits: u16) -> [u8; C1G2_PC_SIZE] {
    let [hi, lo] = pc_bits.to_be_bytes();
    [0x80 | C1G2_PC_TYPE, hi, lo]
}

/// Wrap `EPCData` and air-protocol parameters into a `TagReportData`.
///
/// # Errors
///
/// Returns `EncodingFailed` if the total length does not fit the 16-bit
/// length field.
pub fn tag_report_data(epc_data: &[u8], air_protocol: &[u8]) -> Result<Bytes> {
    let total = TLV_HEADER_SIZE + epc_data.len() + air_protocol.len();
    let length = u16::try_from(total).map_err(|_| {
        TagReportError::EncodingFailed(format!(
            "TagReportData length {} exceeds {}",
            total,
            u16::MAX
        ))
    })?;

    let mut buf = BytesMut::with_capacity(total);
    buf.put_u16(TAG_REPORT_DATA_TYPE);
    buf.put_u16(length);
    buf.put_slice(epc_data);
    buf.put_slice(air_protocol);
    Ok(buf.freeze())
}

/// Turns a tag into the parameter bytes that go into a report batch.
///
/// Implementations must be deterministic and return exactly the bytes that
/// will be transmitted, since their length drives budget accounting.
pub trait ParameterEncoder {
    /// Encode one tag.
    fn encode(&self, tag: &Tag) -> Result<Bytes>;
}

impl<F> ParameterEncoder for F
where
    F: Fn(&Tag) -> Result<Bytes>,
{
    fn encode(&self, tag: &Tag) -> Result<Bytes> {
        self(tag)
    }
}

/// LLRP 1.0.1 `TagReportData` encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct LlrpEncoder;

impl LlrpEncoder {
    /// Encoded size of a tag without building it.
    #[inline]
    pub fn encoded_len(tag: &Tag) -> usize {
        TLV_HEADER_SIZE + epc_data_size(tag.epc().len()) + C1G2_PC_SIZE
    }
}

impl ParameterEncoder for LlrpEncoder {
    fn encode(&self, tag: &Tag) -> Result<Bytes> {
        let epcd = epc_data(tag.length(), tag.epc_length_bits(), tag.epc());
        let aptd = c1g2_pc(tag.pc_bits());
        tag_report_data(&epcd, &aptd)
    }
}
