//! Conversation-level lifecycle: frame_index ordering, idempotent replay of a
//! captured frame (property 3), and RST_STREAM's effect on pending chunks.

use spdy_sans_io::{Config, ControlPayload, Conversation, Direction, FramePayload, ProcessError};

fn ping_frame(id: u32) -> Vec<u8> {
    let mut bytes = vec![0x80, 0x03, 0x00, 0x06, 0x00, 0x00, 0x00, 0x04];
    bytes.extend_from_slice(&id.to_be_bytes());
    bytes
}

fn zlib_name_value_block(pairs: &[(&str, &str)]) -> Vec<u8> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut block = Vec::new();
    block.extend_from_slice(&(pairs.len() as u32).to_be_bytes());
    for (name, value) in pairs {
        block.extend_from_slice(&(name.len() as u32).to_be_bytes());
        block.extend_from_slice(name.as_bytes());
        block.extend_from_slice(&(value.len() as u32).to_be_bytes());
        block.extend_from_slice(value.as_bytes());
    }

    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(&block).unwrap();
    enc.finish().unwrap()
}

fn syn_stream_frame(stream_id: u32, pairs: &[(&str, &str)]) -> Vec<u8> {
    let compressed = zlib_name_value_block(pairs);
    let mut payload = Vec::new();
    payload.extend_from_slice(&stream_id.to_be_bytes());
    payload.extend_from_slice(&0u32.to_be_bytes());
    payload.push(0x00);
    payload.push(0x00);
    payload.extend_from_slice(&compressed);

    let mut frame = vec![0x80, 0x03, 0x00, 0x01, 0x00];
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes()[1..]);
    frame.extend_from_slice(&payload);
    frame
}

#[test]
fn frame_index_must_be_non_decreasing_within_a_direction() {
    let mut conv = Conversation::new(Config::default());
    conv.process(Direction::Request, 5, &ping_frame(1)).unwrap();
    let err = conv.process(Direction::Request, 3, &ping_frame(2)).unwrap_err();
    assert_eq!(err, ProcessError::FrameIndexWentBackwards { last: 5, got: 3 });
}

#[test]
fn repeating_a_frame_index_replays_without_reappending() {
    let mut conv = Conversation::new(Config::default());
    conv.process(Direction::Request, 1, &ping_frame(1)).unwrap();
    let replay = conv.process(Direction::Request, 1, &ping_frame(1)).unwrap();
    assert_eq!(replay.records.len(), 1);
    match &replay.records[0].payload {
        FramePayload::Control { payload: ControlPayload::Ping(p), .. } => assert_eq!(p.id, 1),
        other => panic!("unexpected payload: {other:?}"),
    }
}

/// Property 3: replaying the same captured frame twice must not advance the
/// per-direction inflater, and must yield identical decoded headers both times.
#[test]
fn property_3_replay_is_idempotent_and_does_not_advance_inflater() {
    let frame = syn_stream_frame(1, &[("method", "GET"), ("url", "/"), ("version", "HTTP/1.1")]);
    let mut conv = Conversation::new(Config::default());

    let first = conv.process(Direction::Request, 7, &frame).unwrap();
    let first_headers = match &first.records[0].payload {
        FramePayload::Control { payload: ControlPayload::SynStream { headers, .. }, .. } => {
            headers.clone()
        }
        other => panic!("unexpected payload: {other:?}"),
    };

    let second = conv.process(Direction::Request, 7, &frame).unwrap();
    let second_headers = match &second.records[0].payload {
        FramePayload::Control { payload: ControlPayload::SynStream { headers, .. }, .. } => {
            headers.clone()
        }
        other => panic!("unexpected payload: {other:?}"),
    };

    assert_eq!(first_headers, second_headers);
}

#[test]
fn headers_frame_updates_content_encoding_without_clobbering_content_type() {
    let syn = syn_stream_frame(3, &[("content-type", "text/html"), ("method", "GET")]);
    let mut conv = Conversation::new(Config::default());
    conv.process(Direction::Request, 1, &syn).unwrap();

    let headers_block = zlib_name_value_block(&[("content-encoding", "gzip")]);
    let mut payload = Vec::new();
    payload.extend_from_slice(&3u32.to_be_bytes());
    payload.extend_from_slice(&headers_block);
    let mut frame = vec![0x80, 0x03, 0x00, 0x08, 0x00];
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes()[1..]);
    frame.extend_from_slice(&payload);

    conv.process(Direction::Request, 2, &frame).unwrap();

    let info = conv.streams().get_stream_info(3).unwrap();
    assert_eq!(info.content_type.as_deref(), Some("text/html"));
    assert_eq!(info.content_encoding.as_deref(), Some("gzip"));
}
