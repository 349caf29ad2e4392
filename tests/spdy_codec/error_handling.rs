//! Malformed-input scenarios: every diagnostic is attached to its
//! `DecodeRecord` as an annotation, never raised as an `Err` from
//! `process` unless the caller itself misused the frame_index contract.

use spdy_sans_io::{Config, ControlPayload, Conversation, DecodeError, Direction, FramePayload};

/// S6: SETTINGS declares 1 entry but the payload is too short to hold it.
#[test]
fn s6_settings_truncated_is_malformed_but_the_frame_is_still_consumed() {
 let mut payload = Vec::new();
 payload.extend_from_slice(&1u32.to_be_bytes());
 payload.push(0x00); // only 1 byte follows, not the 8 a full entry needs

 let mut frame = vec![0x80, 0x03, 0x00, 0x04, 0x00];
 frame.extend_from_slice(&(payload.len() as u32).to_be_bytes()[1..]);
 frame.extend_from_slice(&payload);

 let mut conv = Conversation::new(Config::default());
 let outcome = conv.process(Direction::Request, 1, &frame).unwrap();
 assert_eq!(outcome.records.len(), 1);
 assert!(outcome.records[0].has_errors());
 assert!(matches!(
 outcome.records[0].errors[0],
 DecodeError::MalformedSettings { declared_entries: 1,.. }
 ));
}

#[test]
fn unrecognised_control_type_is_flagged_but_frame_length_is_respected() {
 let frame = [0x80, 0x03, 0x00, 0x63, 0x00, 0x00, 0x00, 0x02, 0xAA, 0xBB];
 let mut conv = Conversation::new(Config::default());
 let outcome = conv.process(Direction::Request, 1, &frame).unwrap();
 assert_eq!(outcome.records.len(), 1);
 assert!(matches!(
 outcome.records[0].errors[0],
 DecodeError::MalformedType { raw_type: 0x63 }
 ));
 assert!(matches!(
 outcome.records[0].payload,
 FramePayload::Control { payload: ControlPayload::Unknown(0x63),.. }
 ));
}

#[test]
fn rst_stream_too_short_is_malformed() {
 let mut frame = vec![0x80, 0x03, 0x00, 0x03, 0x00, 0x00, 0x00, 0x04];
 frame.extend_from_slice(&[0, 0, 0, 7]); // stream id only, no status word

 let mut conv = Conversation::new(Config::default());
 let outcome = conv.process(Direction::Request, 1, &frame).unwrap();
 assert!(outcome.records[0].has_errors());
 assert!(matches!(
 outcome.records[0].errors[0],
 DecodeError::MalformedRstStream { available_bytes: 4 }
 ));
}

/// A control frame whose version is below the minimum supported is
/// length-skipped without ever touching the header-block inflater.
#[test]
fn unsupported_version_skips_the_frame_without_decoding_it() {
 let mut frame = vec![0x80, 0x02, 0x00, 0x06, 0x00, 0x00, 0x00, 0x04];
 frame.extend_from_slice(&[0, 0, 0, 1]);

 let mut conv = Conversation::new(Config::default());
 let outcome = conv.process(Direction::Request, 1, &frame).unwrap();
 assert_eq!(outcome.records.len(), 1);
 assert!(matches!(
 outcome.records[0].errors[0],
 DecodeError::UnsupportedVersion { version: 2 }
 ));
 assert!(matches!(
 outcome.records[0].payload,
 FramePayload::Control { payload: ControlPayload::UnsupportedVersion,.. }
 ));
}

/// A header-block cap set lower than a real compressed block triggers
/// `OversizedHeaderBlock` rather than an unbounded allocation.
#[test]
fn oversized_header_block_is_capped_and_reported() {
 use flate2::write::ZlibEncoder;
 use flate2::Compression;
 use std::io::Write;

 let mut name_value_block = Vec::new();
 name_value_block.extend_from_slice(&1u32.to_be_bytes());
 let name = "x-padding";
 let value = "a".repeat(4096);
 name_value_block.extend_from_slice(&(name.len() as u32).to_be_bytes());
 name_value_block.extend_from_slice(name.as_bytes());
 name_value_block.extend_from_slice(&(value.len() as u32).to_be_bytes());
 name_value_block.extend_from_slice(value.as_bytes());

 let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
 enc.write_all(&name_value_block).unwrap();
 let compressed = enc.finish().unwrap();

 let mut payload = Vec::new();
 payload.extend_from_slice(&1u32.to_be_bytes()); // stream id
 payload.extend_from_slice(&0u32.to_be_bytes()); // assoc stream id
 payload.push(0x00);
 payload.push(0x00);
 payload.extend_from_slice(&compressed);

 let mut frame = vec![0x80, 0x03, 0x00, 0x01, 0x00];
 frame.extend_from_slice(&(payload.len() as u32).to_be_bytes()[1..]);
 frame.extend_from_slice(&payload);

 let mut conv = Conversation::new(Config {
 max_header_block_bytes: 64,
..Config::default()
 });
 let outcome = conv.process(Direction::Request, 1, &frame).unwrap();
 assert!(outcome.records[0].has_errors());
 assert!(matches!(
 outcome.records[0].errors[0],
 DecodeError::OversizedHeaderBlock {.. }
 ));
}
