//! Desegmentation across arbitrary transport fragmentation (C8, testable
//! property 2) and the first-byte heuristic entry point.

use spdy_sans_io::{Config, Conversation, Desegmentation, Direction};

fn ping_frame(id: u32) -> Vec<u8> {
 let mut bytes = vec![0x80, 0x03, 0x00, 0x06, 0x00, 0x00, 0x00, 0x04];
 bytes.extend_from_slice(&id.to_be_bytes());
 bytes
}

fn window_update_frame(stream_id: u32, delta: u32) -> Vec<u8> {
 let mut bytes = vec![0x80, 0x03, 0x00, 0x09, 0x00, 0x00, 0x00, 0x08];
 bytes.extend_from_slice(&stream_id.to_be_bytes());
 bytes.extend_from_slice(&delta.to_be_bytes());
 bytes
}

/// S5: splitting a single frame after 4 bytes requests exactly the deficit,
/// then the next call with the remainder completes it.
#[test]
fn s5_split_frame_requests_exact_deficit_then_completes() {
 let frame = ping_frame(42);
 let mut conv = Conversation::new(Config::default());

 let first = conv.process(Direction::Request, 1, &frame[..4]).unwrap();
 assert!(first.records.is_empty());
 assert_eq!(first.desegmentation, Some(Desegmentation { needed_additional_bytes: 4 }));

 let second = conv.process(Direction::Request, 2, &frame[4..]).unwrap();
 assert_eq!(second.records.len(), 1);
 assert!(second.desegmentation.is_none());
}

/// Property 2: the set of emitted descriptors for two back-to-back frames is
/// independent of where the byte stream is cut, whether that's mid-header,
/// mid-payload, or exactly on a frame boundary.
#[test]
fn desegmentation_is_split_position_independent() {
 let mut stream = ping_frame(1);
 stream.extend_from_slice(&window_update_frame(3, 4096));

 for cut in 1..stream.len() {
 let mut conv = Conversation::new(Config::default());
 let mut records = Vec::new();

 let first = conv.process(Direction::Request, 1, &stream[..cut]).unwrap();
 records.extend(first.records);
 let second = conv.process(Direction::Request, 2, &stream[cut..]).unwrap();
 records.extend(second.records);

 assert_eq!(records.len(), 2, "cut at {cut} produced {} records", records.len());
 }
}

/// The boundary case of property 2: the whole stream arrives in one call.
#[test]
fn desegmentation_handles_multiple_frames_in_one_buffer() {
 let mut stream = ping_frame(1);
 stream.extend_from_slice(&window_update_frame(3, 4096));
 stream.extend_from_slice(&ping_frame(2));

 let mut conv = Conversation::new(Config::default());
 let outcome = conv.process(Direction::Request, 1, &stream).unwrap();
 assert_eq!(outcome.records.len(), 3);
 assert!(outcome.desegmentation.is_none());
}

/// S7: a first byte outside {0x00, 0x80} is rejected by the heuristic with no
/// observable side effects on the conversation's desegmentation state.
#[test]
fn s7_heuristic_rejects_and_leaves_no_trace() {
 let mut conv = Conversation::new(Config::default());
 let not_spdy = [0x7F, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
 assert!(conv.try_heuristic(Direction::Request, 1, &not_spdy).is_none());

 // A genuine SPDY frame afterwards still starts cleanly from offset zero.
 let outcome = conv.try_heuristic(Direction::Request, 2, &ping_frame(7)).unwrap();
 assert_eq!(outcome.records.len(), 1);
}

#[test]
fn heuristic_accepts_a_genuine_data_frame_first_byte() {
 let data_frame = [0x00, 0x00, 0x00, 0x05, 0x01, 0x00, 0x00, 0x03, b'a', b'b', b'c'];
 let mut conv = Conversation::new(Config::default());
 let outcome = conv.try_heuristic(Direction::Request, 1, &data_frame);
 assert!(outcome.is_some());
}

/// Within one direction, frame_index must be non-decreasing (ordering
/// guarantee); the two directions are independent of each other.
#[test]
fn directions_order_independently_of_each_other() {
 let mut conv = Conversation::new(Config::default());
 conv.process(Direction::Request, 10, &ping_frame(1)).unwrap();
 // Reply direction can start at a lower frame_index without conflict.
 conv.process(Direction::Reply, 2, &ping_frame(2)).unwrap();
 conv.process(Direction::Request, 11, &ping_frame(3)).unwrap();
 conv.process(Direction::Reply, 3, &ping_frame(4)).unwrap();
}
