//! Field-level tag record parsing.
//!
//! A record is four text fields in column order:
//!
//! ```text
//! ┌──────────┬──────────┬───────────────┬──────────┐
//! │ PC bits  │ Length   │ EPC len bits  │ EPC      │
//! │ base-16  │ base-10  │ base-10       │ hex      │
//! │ u16      │ u16      │ u16           │ bytes    │
//! └──────────┴──────────┴───────────────┴──────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use tagreport::codec::record::parse_fields;
//!
//! let tag = parse_fields(&["3000", "18", "96", "E2003412"]).unwrap();
//! assert_eq!(tag.pc_bits(), 0x3000);
//! assert_eq!(tag.epc(), &[0xE2, 0x00, 0x34, 0x12]);
//!
//! assert!(parse_fields(&["1A", "10"]).is_err());
//! ```

use crate::error::RecordError;
use crate::tag::Tag;

/// Number of fields in a tag record.
pub const FIELD_COUNT: usize = 4;

/// Result of pulling one record from a record source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A well-formed record.
    Tag(Tag),
    /// A record that was read but could not be parsed.
    Malformed(RecordError),
    /// No more records.
    EndOfInput,
}

/// Build a tag from its four text fields.
///
/// Fields are taken as-is; surrounding whitespace makes a field malformed.
pub fn parse_fields<S: AsRef<str>>(fields: &[S]) -> Result<Tag, RecordError> {
    if fields.len() != FIELD_COUNT {
        return Err(RecordError::FieldCount(fields.len()));
    }

    let pc = fields[0].as_ref();
    let length = fields[1].as_ref();
    let epc_len = fields[2].as_ref();
    let epc = fields[3].as_ref();

    let pc_bits = parse_u16(pc, 16)
        .ok_or_else(|| RecordError::ControlBits(pc.to_string()))?;
    let length_value = parse_u16(length, 10)
        .ok_or_else(|| RecordError::Length(length.to_string()))?;
    let epc_length_bits = parse_u16(epc_len, 10)
        .ok_or_else(|| RecordError::EpcLengthBits(epc_len.to_string()))?;
    let epc_bytes = hex::decode(epc).map_err(|_| RecordError::Epc(epc.to_string()))?;

    Ok(Tag::new(pc_bits, length_value, epc_length_bits, epc_bytes))
}

/// Render a tag as its four text fields.
pub fn format_fields(tag: &Tag) -> [String; FIELD_COUNT] {
    let record = tag.to_record();
    [record.pc_bits, record.length, record.epc_length_bits, record.epc]
}

/// Unsigned 16-bit parse with no sign prefix allowed.
fn parse_u16(s: &str, radix: u32) -> Option<u16> {
    if s.is_empty() || !s.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u16::from_str_radix(s, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_record() {
        let tag = parse_fields(&["3000", "18", "96", "300833b2ddd9014000000000"]).unwrap();

        assert_eq!(tag.pc_bits(), 0x3000);
        assert_eq!(tag.length(), 18);
        assert_eq!(tag.epc_length_bits(), 96);
        assert_eq!(tag.epc().len(), 12);
        assert_eq!(tag.epc()[0], 0x30);
    }

    #[test]
    fn test_parse_rejects_padded_fields() {
        assert_eq!(
            parse_fields(&[" 3000", "18", "96", "abcd"]),
            Err(RecordError::ControlBits(" 3000".to_string()))
        );
        assert!(matches!(
            parse_fields(&["3000", "18 ", "96", "abcd"]),
            Err(RecordError::Length(_))
        ));
        assert!(matches!(
            parse_fields(&["3000", "18", " 96", "abcd"]),
            Err(RecordError::EpcLengthBits(_))
        ));
        assert!(matches!(
            parse_fields(&["3000", "18", "96", " abcd"]),
            Err(RecordError::Epc(_))
        ));
    }

    #[test]
    fn test_parse_wrong_arity() {
        assert_eq!(parse_fields(&["1A", "10"]), Err(RecordError::FieldCount(2)));
        assert_eq!(
            parse_fields(&["1", "2", "3", "04", "5"]),
            Err(RecordError::FieldCount(5))
        );
        let empty: [&str; 0] = [];
        assert_eq!(parse_fields(&empty), Err(RecordError::FieldCount(0)));
    }

    #[test]
    fn test_parse_bad_pc_bits() {
        assert_eq!(
            parse_fields(&["zz", "18", "96", "00"]),
            Err(RecordError::ControlBits("zz".to_string()))
        );
        // 17 bits does not fit
        assert!(matches!(
            parse_fields(&["1ffff", "18", "96", "00"]),
            Err(RecordError::ControlBits(_))
        ));
        assert!(matches!(
            parse_fields(&["+30", "18", "96", "00"]),
            Err(RecordError::ControlBits(_))
        ));
    }

    #[test]
    fn test_parse_length_is_decimal() {
        assert!(matches!(
            parse_fields(&["3000", "1a", "96", "00"]),
            Err(RecordError::Length(_))
        ));
        assert!(matches!(
            parse_fields(&["3000", "70000", "96", "00"]),
            Err(RecordError::Length(_))
        ));
        assert!(matches!(
            parse_fields(&["3000", "18", "-1", "00"]),
            Err(RecordError::EpcLengthBits(_))
        ));
    }

    #[test]
    fn test_parse_bad_epc() {
        assert!(matches!(
            parse_fields(&["3000", "18", "96", "xyz0"]),
            Err(RecordError::Epc(_))
        ));
        // Odd number of hex digits
        assert!(matches!(
            parse_fields(&["3000", "18", "96", "abc"]),
            Err(RecordError::Epc(_))
        ));
    }

    #[test]
    fn test_parse_empty_epc_allowed() {
        let tag = parse_fields(&["0", "6", "0", ""]).unwrap();
        assert!(tag.epc().is_empty());
    }

    #[test]
    fn test_format_normalizes_hex_case() {
        let tag = parse_fields(&["3A00", "18", "96", "ABCDEF"]).unwrap();
        assert_eq!(format_fields(&tag), ["3a00", "18", "96", "abcdef"]);
    }
}
