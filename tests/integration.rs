//! Integration tests for tagreport.
//!
//! These tests verify the path from tag records through batching to the
//! report stream on the wire.

use std::io::Cursor;

use proptest::prelude::*;
use tagreport::batch::{BatcherConfig, ReportBatcher};
use tagreport::codec::csv::{read_tags, write_tags};
use tagreport::codec::record::parse_fields;
use tagreport::codec::JsonCodec;
use tagreport::protocol::{LlrpEncoder, ParameterEncoder, ReportBuffer};
use tagreport::tag::{dedup, index_of, Tag};
use tagreport::writer::ReportWriter;

const TAGS_CSV: &str = "\
3000,18,96,300833b2ddd9014000000001
3000,18,96,300833b2ddd9014000000002
3400,22,128,e2801160600002054cc2096f00000001
1A,10
3000,18,96,300833b2ddd9014000000003
";

/// Test CSV input through to concatenated parameters.
#[test]
fn test_csv_to_batches() {
    let tags = read_tags(TAGS_CSV.as_bytes()).unwrap();
    assert_eq!(tags.len(), 4);

    // 25 + 25 + 29 + 25 bytes; 50 bytes of room per batch
    let batcher = ReportBatcher::new(BatcherConfig::new(150));
    let batches = batcher.batch(&tags).unwrap();

    let counts: Vec<usize> = batches.iter().map(|b| b.tag_count()).collect();
    assert_eq!(counts, vec![2, 1, 1]);
    assert_eq!(batches.total_tag_count(), 4);
    assert_eq!(batches.get(1).unwrap().len(), 29);
}

/// Test CSV write then read returns the same tags.
#[test]
fn test_csv_write_read_cycle() {
    let tags = read_tags(TAGS_CSV.as_bytes()).unwrap();

    let mut out = Vec::new();
    let report = write_tags(&mut out, &tags);
    assert_eq!(report.written, tags.len());

    assert_eq!(read_tags(&out[..]).unwrap(), tags);
}

/// Test JSON interchange agrees with CSV.
#[test]
fn test_json_matches_csv() {
    let tags = read_tags(TAGS_CSV.as_bytes()).unwrap();
    let json = JsonCodec::encode_tags(&tags).unwrap();
    assert_eq!(JsonCodec::decode_tags(&json).unwrap(), tags);
}

/// Test explicit dedup before batching.
#[test]
fn test_dedup_before_batching() {
    let input = "\
3000,18,96,aaaa
3400,20,96,aaaa
3000,18,96,bbbb
";
    let tags = read_tags(input.as_bytes()).unwrap();
    assert_eq!(index_of(&tags, &tags[1]), Some(0));

    let unique = dedup(&tags);
    assert_eq!(unique.len(), 2);

    let batches = ReportBatcher::new(BatcherConfig::default())
        .batch(&unique)
        .unwrap();
    assert_eq!(batches.total_tag_count(), 2);
}

/// Test the report stream carries every batch in order.
#[tokio::test]
async fn test_batches_to_report_stream() {
    let tags: Vec<Tag> = (0u16..40)
        .map(|i| {
            let mut epc = vec![0x30; 10];
            epc.extend_from_slice(&i.to_be_bytes());
            Tag::new(0x3000, 18, 96, epc)
        })
        .collect();
    let batches = ReportBatcher::new(BatcherConfig::new(300))
        .batch(&tags)
        .unwrap();
    assert_eq!(batches.len(), 5);

    let mut writer = ReportWriter::with_defaults(Cursor::new(Vec::new()));
    let summary = writer.write_sequence(&batches).await.unwrap();
    assert_eq!(summary.tags, 40);

    let stream = writer.into_inner().into_inner();
    let mut buffer = ReportBuffer::new();
    let messages = buffer.push(&stream).unwrap();
    assert!(buffer.is_empty());

    assert_eq!(messages.len(), batches.len());
    for (i, (message, batch)) in messages.iter().zip(&batches).enumerate() {
        assert_eq!(message.message_id(), i as u32 + 1);
        assert_eq!(message.payload(), batch.parameter());
    }
}

/// Test a report stream reassembled from small reads.
#[tokio::test]
async fn test_report_stream_fragmented_reads() {
    let tags: Vec<Tag> = (0u8..12)
        .map(|i| Tag::new(0x3000, 18, 96, vec![i; 12]))
        .collect();
    let batches = ReportBatcher::new(BatcherConfig::new(200))
        .batch(&tags)
        .unwrap();

    let mut writer = ReportWriter::with_defaults(Cursor::new(Vec::new()));
    writer.write_sequence(&batches).await.unwrap();
    let stream = writer.into_inner().into_inner();

    let mut buffer = ReportBuffer::new();
    let mut messages = Vec::new();
    for chunk in stream.chunks(13) {
        messages.extend(buffer.push(chunk).unwrap());
    }

    let tag_bytes: usize = messages.iter().map(|m| m.payload().len()).sum();
    assert_eq!(messages.len(), 3);
    assert_eq!(tag_bytes, 12 * 25);
}

fn arb_tag() -> impl Strategy<Value = Tag> {
    (
        any::<u16>(),
        any::<u16>(),
        any::<u16>(),
        prop::collection::vec(any::<u8>(), 0..40),
    )
        .prop_map(|(pc, length, bits, epc)| Tag::new(pc, length, bits, epc))
}

proptest! {
    #[test]
    fn prop_batches_preserve_encoded_stream(
        tags in prop::collection::vec(arb_tag(), 0..60),
        budget in 100usize..600,
    ) {
        let batches = ReportBatcher::new(BatcherConfig::new(budget)).batch(&tags).unwrap();

        let mut expected = Vec::new();
        for tag in &tags {
            expected.extend_from_slice(&LlrpEncoder.encode(tag).unwrap());
        }
        let joined: Vec<u8> = batches
            .iter()
            .flat_map(|b| b.parameter().to_vec())
            .collect();

        prop_assert_eq!(joined, expected);
        prop_assert_eq!(batches.total_tag_count(), tags.len());
    }

    #[test]
    fn prop_batches_respect_budget(
        tags in prop::collection::vec(arb_tag(), 1..60),
        budget in 100usize..600,
        overhead in 0usize..120,
    ) {
        let config = BatcherConfig::new(budget).framing_overhead(overhead);
        let batches = ReportBatcher::new(config.clone()).batch(&tags).unwrap();

        for batch in &batches {
            if batch.is_oversized() {
                prop_assert_eq!(batch.tag_count(), 1);
                prop_assert!(!config.fits(batch.len()));
            } else {
                prop_assert!(config.fits(batch.len()));
            }
        }
    }

    #[test]
    fn prop_greedy_never_leaves_room_for_next(
        tags in prop::collection::vec(arb_tag(), 2..60),
        budget in 100usize..600,
    ) {
        let config = BatcherConfig::new(budget);
        let batches = ReportBatcher::new(config.clone()).batch(&tags).unwrap();

        let mut next_tag = 0;
        for pair in batches.iter().collect::<Vec<_>>().windows(2) {
            next_tag += pair[0].tag_count();
            let next_len = LlrpEncoder::encoded_len(&tags[next_tag]);
            prop_assert!(!config.fits(pair[0].len() + next_len));
        }
    }

    #[test]
    fn prop_record_round_trip(
        pc in any::<u16>(),
        length in any::<u16>(),
        bits in any::<u16>(),
        epc in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let text = [
            format!("{:X}", pc),
            length.to_string(),
            bits.to_string(),
            hex::encode_upper(&epc),
        ];
        let tag = parse_fields(&text).unwrap();
        let record = tag.to_record();

        prop_assert_eq!(record.pc_bits, text[0].to_lowercase());
        prop_assert_eq!(record.length, text[1].clone());
        prop_assert_eq!(record.epc_length_bits, text[2].clone());
        prop_assert_eq!(record.epc, text[3].to_lowercase());
    }

    #[test]
    fn prop_duplicate_symmetric_and_weaker_than_eq(a in arb_tag(), b in arb_tag()) {
        prop_assert!(a.is_duplicate(&a));
        prop_assert_eq!(a.is_duplicate(&b), b.is_duplicate(&a));
        if a == b {
            prop_assert!(a.is_duplicate(&b));
        }
    }
}
