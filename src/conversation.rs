//! Desegmenter / driver and conversation state.
//!
//! [`Conversation`] is the single entry point: one instance per transport
//! 5-tuple, fed buffers from either direction via [`Conversation::process`]. It
//! owns the per-direction zlib inflaters, the stream registry, and the
//! per-captured-frame memo that makes re-decoding a frame idempotent.

use crate::error::{DecodeError, ProcessError};
use crate::frame::{FrameHeader, FrameKind, MIN_SUPPORTED_VERSION};
use crate::headers::RecognisedFields;
use crate::inflate::HeaderInflater;
use crate::memo::{DataFrameMemo, HeaderBlockMemo};
use crate::payload::{
    parse_goaway, parse_ping, parse_rst_stream, parse_settings, parse_stream_id_fixed,
    parse_syn_stream_fixed, parse_window_update,
};
use crate::reassembly;
use crate::stream::StreamRegistry;

use crate::descriptor::{ControlPayload, DecodeRecord, FramePayload};

/// Which of the two independent header-compression streams a frame belongs to.
/// Also doubles as the arrival-side tag for [`Conversation::process`]:
/// bytes from the client populate `Request`, bytes from the server `Reply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Request,
    Reply,
}

/// Configuration options recognised by the dissector.
#[derive(Debug, Clone)]
pub struct Config {
    pub assemble_entity_bodies: bool,
    pub decompress_headers: bool,
    pub decompress_body: bool,
    pub debug_trace: bool,
    /// Cap on a decompressed header block, to prevent memory exhaustion from
    /// a maliciously crafted or corrupt compression ratio.
    pub max_header_block_bytes: usize,
    /// By default, HEADERS frames are decoded unconditionally against the
    /// reply-direction inflater, on the assumption that no client ever sends
    /// one. Set this to `false` to instead pick request/reply by the stream
    /// id's parity, exactly like SYN_STREAM/SYN_REPLY would.
    pub headers_use_reply_inflater: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assemble_entity_bodies: true,
            decompress_headers: true,
            decompress_body: true,
            debug_trace: false,
            max_header_block_bytes: 1024 * 1024,
            headers_use_reply_inflater: true,
        }
    }
}

/// Returned when a frame is incomplete at the end of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Desegmentation {
    pub needed_additional_bytes: usize,
}

/// Everything produced by one [`Conversation::process`] call.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutcome {
    pub records: Vec<DecodeRecord>,
    pub desegmentation: Option<Desegmentation>,
}

impl ProcessOutcome {
    /// Forward every completed DATA body in this batch to `sink`.
    /// The core never calls this itself; it is a convenience for hosts that
    /// want the collaborator boundary wired up without walking `records` by hand.
    pub fn dispatch_bodies(&self, sink: &mut impl crate::sink::BodySink) {
        for record in &self.records {
            if let FramePayload::Data {
                stream_id,
                outcome: crate::reassembly::DataOutcome::Assembled {
                    content_type,
                    content_type_params,
                    body,
                    ..
                },
                ..
            } = &record.payload
            {
                sink.deliver_body(
                    *stream_id,
                    content_type.as_deref(),
                    content_type_params.as_deref(),
                    body,
                );
            }
        }
    }
}

/// Per-direction buffering state for the desegmenter.
#[derive(Debug, Clone, Default)]
struct DirectionState {
    /// Every byte ever handed to this direction. Never truncated: a completed
    /// frame's bytes must stay addressable so a later re-dissection (same
    /// `frame_index`) can replay without re-touching the inflater.
    buffer: Vec<u8>,
    /// How far framing has been parsed, i.e. the start of the next undissected frame.
    parsed_offset: usize,
    /// The `frame_index` most recently passed to `process` for this direction.
    last_frame_index: Option<u64>,
    /// `parsed_offset` as it stood before the most recent forward call began;
    /// used to replay exactly the frames that call produced when the same
    /// `frame_index` is seen again.
    replay_start_offset: usize,
}

/// One connection's worth of SPDY state. Owns everything that must
/// survive across frames in either direction; nothing here is ever shared with
/// another conversation.
pub struct Conversation {
    config: Config,
    request_inflate: HeaderInflater,
    reply_inflate: HeaderInflater,
    streams: StreamRegistry,
    memo: HeaderBlockMemo,
    data_memo: DataFrameMemo,
    request_state: DirectionState,
    reply_state: DirectionState,
}

impl Conversation {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            request_inflate: HeaderInflater::new(Direction::Request),
            reply_inflate: HeaderInflater::new(Direction::Reply),
            streams: StreamRegistry::new(),
            memo: HeaderBlockMemo::new(),
            data_memo: DataFrameMemo::new(),
            request_state: DirectionState::default(),
            reply_state: DirectionState::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn streams(&self) -> &StreamRegistry {
        &self.streams
    }

    fn state(&self, direction: Direction) -> &DirectionState {
        match direction {
            Direction::Request => &self.request_state,
            Direction::Reply => &self.reply_state,
        }
    }

    fn state_mut(&mut self, direction: Direction) -> &mut DirectionState {
        match direction {
            Direction::Request => &mut self.request_state,
            Direction::Reply => &mut self.reply_state,
        }
    }

    /// Feed one arriving buffer for `direction`, tagged with the caller's
    /// `frame_index` (e.g. a capture's packet number). Frame indices within a
    /// direction must be non-decreasing (frames within one direction are
    /// processed strictly in transport arrival order).
    ///
    /// A repeat call with the same `frame_index` as the previous call on this
    /// direction is treated as a re-dissection of the same captured data: `data`
    /// is not re-appended, and the frames produced last time are replayed from
    /// the per-frame memo without touching the inflaters again, giving
    /// idempotence for replay.
    pub fn process(
        &mut self,
        direction: Direction,
        frame_index: u64,
        data: &[u8],
    ) -> Result<ProcessOutcome, ProcessError> {
        let is_replay = match self.state(direction).last_frame_index {
            Some(last) if frame_index == last => true,
            Some(last) if frame_index < last => {
                return Err(ProcessError::FrameIndexWentBackwards { last, got: frame_index })
            }
            _ => false,
        };

        let (parse_from, parse_to) = if is_replay {
            let state = self.state(direction);
            (state.replay_start_offset, state.parsed_offset)
        } else {
            let state = self.state_mut(direction);
            state.buffer.extend_from_slice(data);
            state.replay_start_offset = state.parsed_offset;
            state.last_frame_index = Some(frame_index);
            (state.parsed_offset, state.buffer.len())
        };

        // Copied out so the loop below can freely borrow `self` mutably for
        // decompression and stream-registry updates without fighting the
        // borrow checker over `self.request_state`/`self.reply_state`.
        let window = self.state(direction).buffer[parse_from..parse_to].to_vec();

        let mut records = Vec::new();
        let mut consumed = 0usize;
        let mut desegmentation = None;

        loop {
            let remaining = &window[consumed..];
            if remaining.len() < FrameHeader::SIZE {
                if !remaining.is_empty() {
                    // The total frame length lives in the header's last three
                    // bytes, so until all `FrameHeader::SIZE` bytes are in hand
                    // the only deficit this driver can know is the one against
                    // completing the header itself — it cannot yet see the
                    // payload length to report the whole frame's deficit. A
                    // scenario that splits mid-header (e.g. 4 of PING's 12
                    // bytes) therefore gets a smaller `needed_additional_bytes`
                    // here than the frame's true remaining size; the next call
                    // with the rest of the header re-evaluates and asks for any
                    // further payload bytes still missing. Forward progress and
                    // the final set of decoded records are unaffected either way.
                    desegmentation = Some(Desegmentation {
                        needed_additional_bytes: FrameHeader::SIZE - remaining.len(),
                    });
                }
                break;
            }

            let header = FrameHeader::parse(remaining).expect("length checked above");
            let total = header.total_size();
            if remaining.len() < total {
                desegmentation = Some(Desegmentation {
                    needed_additional_bytes: total - remaining.len(),
                });
                break;
            }

            if self.config.debug_trace {
                log::trace!(
                    "{direction:?} frame_index={frame_index} kind={:?} length={} at offset={}",
                    header.kind,
                    header.length,
                    parse_from + consumed,
                );
            }

            let frame_bytes = &remaining[..total];
            let record = self.dissect_frame(frame_index, &header, frame_bytes);
            records.push(record);
            consumed += total;
        }

        if !is_replay {
            self.state_mut(direction).parsed_offset += consumed;
        }

        Ok(ProcessOutcome { records, desegmentation })
    }

    /// The heuristic entry point: peek the first byte before
    /// committing to a full pass. On rejection, or on a pass that consumes no
    /// complete frame, the conversation is left exactly as it was found.
    pub fn try_heuristic(
        &mut self,
        direction: Direction,
        frame_index: u64,
        data: &[u8],
    ) -> Option<ProcessOutcome> {
        if !looks_like_spdy(data) {
            return None;
        }
        let snapshot = self.state(direction).clone();
        match self.process(direction, frame_index, data) {
            Ok(outcome) if !outcome.records.is_empty() => Some(outcome),
            _ => {
                *self.state_mut(direction) = snapshot;
                None
            }
        }
    }

    fn dissect_frame(
        &mut self,
        frame_index: u64,
        header: &FrameHeader,
        frame_bytes: &[u8],
    ) -> DecodeRecord {
        let payload = &frame_bytes[FrameHeader::SIZE..];
        let mut errors = Vec::new();

        let (payload_out, info) = if header.control {
            let version = header.version.unwrap_or(0);
            if version < MIN_SUPPORTED_VERSION {
                errors.push(DecodeError::UnsupportedVersion { version });
                (
                    FramePayload::Control {
                        version,
                        payload: ControlPayload::UnsupportedVersion,
                    },
                    None,
                )
            } else {
                self.dissect_control(frame_index, header, version, payload, &mut errors)
            }
        } else {
            let stream_id = header.stream_id.unwrap_or(0);
            let fin = header.is_fin();
            // A replay of an already-dissected captured frame must not re-mutate
            // the stream's chunk list or frame count a second time, mirroring the
            // header-block memo's guard against re-entering the inflater.
            let outcome = if let Some(cached) = self.data_memo.get(frame_index, stream_id) {
                cached.clone()
            } else {
                // A DATA frame for a stream id never seen in a SYN/HEADERS frame
                // is decoded as raw bytes without creating a registry entry for it.
                let mut scratch = crate::stream::StreamInfo::default();
                let known = self.streams.get_stream_info(stream_id).is_some();
                let stream = if known {
                    self.streams.stream_mut(stream_id)
                } else {
                    &mut scratch
                };
                let outcome = reassembly::on_data_frame(
                    stream,
                    stream_id,
                    frame_index,
                    payload,
                    fin,
                    self.config.assemble_entity_bodies,
                    self.config.decompress_body,
                );
                self.data_memo.insert(frame_index, stream_id, outcome.clone());
                outcome
            };
            if let reassembly::DataOutcome::Assembled { body_error: Some(e), .. } = &outcome {
                errors.push(e.clone());
            }
            let info = Some(format!("DATA[{stream_id}] {} bytes{}", payload.len(), if fin { ", FIN" } else { "" }));
            (FramePayload::Data { stream_id, fin, outcome }, info)
        };

        for e in &errors {
            e.log();
        }

        DecodeRecord {
            frame_index,
            flags: header.flags,
            length: header.length,
            payload: payload_out,
            info,
            errors,
        }
    }

    fn dissect_control(
        &mut self,
        frame_index: u64,
        header: &FrameHeader,
        version: u16,
        payload: &[u8],
        errors: &mut Vec<DecodeError>,
    ) -> (FramePayload, Option<String>) {
        let (control, info) = match header.kind {
            FrameKind::Unknown(raw_type) => {
                errors.push(DecodeError::MalformedType { raw_type });
                (ControlPayload::Unknown(raw_type), None)
            }
            FrameKind::SynStream => {
                let fixed = match parse_syn_stream_fixed(payload) {
                    Ok(f) => f,
                    Err(e) => {
                        errors.push(e);
                        return (
                            FramePayload::Control { version, payload: ControlPayload::Unknown(1) },
                            None,
                        );
                    }
                };
                let (headers, mut herr) = self.decode_header_block(
                    frame_index,
                    fixed.stream_id,
                    FrameKind::SynStream,
                    &payload[fixed.header_block_offset..],
                    Direction::Request,
                );
                errors.append(&mut herr);
                let fields = RecognisedFields::extract(&headers);
                let info = fields.syn_stream_info();
                if let Err(e) = self.streams.save_stream_info(
                    fixed.stream_id,
                    fields.content_type.clone(),
                    fields.content_type_params.clone(),
                    fields.content_encoding.clone(),
                ) {
                    log::debug!("{e}");
                }
                (
                    ControlPayload::SynStream {
                        stream_id: fixed.stream_id,
                        assoc_stream_id: fixed.assoc_stream_id,
                        priority: fixed.priority,
                        slot: fixed.slot,
                        unidirectional: header.is_unidirectional(),
                        headers,
                        info: info.clone(),
                    },
                    info,
                )
            }
            FrameKind::SynReply => {
                let fixed = match parse_stream_id_fixed(payload) {
                    Ok(f) => f,
                    Err(e) => {
                        errors.push(e);
                        return (
                            FramePayload::Control { version, payload: ControlPayload::Unknown(2) },
                            None,
                        );
                    }
                };
                let (headers, mut herr) = self.decode_header_block(
                    frame_index,
                    fixed.stream_id,
                    FrameKind::SynReply,
                    &payload[fixed.header_block_offset..],
                    Direction::Reply,
                );
                errors.append(&mut herr);
                let fields = RecognisedFields::extract(&headers);
                let info = fields.syn_reply_info();
                if let Err(e) = self.streams.save_stream_info(
                    fixed.stream_id,
                    fields.content_type.clone(),
                    fields.content_type_params.clone(),
                    fields.content_encoding.clone(),
                ) {
                    log::debug!("{e}");
                }
                (
                    ControlPayload::SynReply {
                        stream_id: fixed.stream_id,
                        headers,
                        info: info.clone(),
                    },
                    info,
                )
            }
            FrameKind::Headers => {
                let fixed = match parse_stream_id_fixed(payload) {
                    Ok(f) => f,
                    Err(e) => {
                        errors.push(e);
                        return (
                            FramePayload::Control { version, payload: ControlPayload::Unknown(8) },
                            None,
                        );
                    }
                };
                // By default the reply-direction inflater is used
                // unconditionally here; `headers_use_reply_inflater = false`
                // instead dispatches by the stream id's parity.
                let inflater_direction = if self.config.headers_use_reply_inflater {
                    Direction::Reply
                } else if fixed.stream_id % 2 == 1 {
                    Direction::Request
                } else {
                    Direction::Reply
                };
                let (headers, mut herr) = self.decode_header_block(
                    frame_index,
                    fixed.stream_id,
                    FrameKind::Headers,
                    &payload[fixed.header_block_offset..],
                    inflater_direction,
                );
                errors.append(&mut herr);
                let fields = RecognisedFields::extract(&headers);
                self.streams.update_stream_info(
                    fixed.stream_id,
                    fields.content_type,
                    fields.content_type_params,
                    fields.content_encoding,
                );
                (
                    ControlPayload::Headers {
                        stream_id: fixed.stream_id,
                        headers,
                    },
                    None,
                )
            }
            FrameKind::RstStream => match parse_rst_stream(payload) {
                Ok(p) => {
                    // Drop the stream's pending chunk list, keeping any
                    // already-`assembled` body for a late display pass.
                    if let Some(info) = self.streams.get_stream_info(p.stream_id) {
                        if !info.data_chunks.is_empty() {
                            self.streams.stream_mut(p.stream_id).release_chunks();
                        }
                    }
                    let info = Some(format!("RST_STREAM[{}] {:?}", p.stream_id, p.status));
                    (ControlPayload::RstStream(p), info)
                }
                Err(e) => {
                    errors.push(e);
                    (ControlPayload::Unknown(3), None)
                }
            },
            FrameKind::Settings => match parse_settings(payload, header.flags) {
                Ok(p) => {
                    let info = Some(format!("SETTINGS {} entr{}", p.entries.len(), if p.entries.len() == 1 { "y" } else { "ies" }));
                    (ControlPayload::Settings(p), info)
                }
                Err(e) => {
                    errors.push(e);
                    (ControlPayload::Unknown(4), None)
                }
            },
            FrameKind::Noop => (ControlPayload::Noop, Some("NOOP".to_string())),
            FrameKind::Ping => match parse_ping(payload) {
                Ok(p) => {
                    let info = Some(format!("PING id={}", p.id));
                    (ControlPayload::Ping(p), info)
                }
                Err(e) => {
                    errors.push(e);
                    (ControlPayload::Unknown(6), None)
                }
            },
            FrameKind::GoAway => match parse_goaway(payload) {
                Ok(p) => {
                    let info = Some(format!("GOAWAY last={} {:?}", p.last_good_stream_id, p.status));
                    (ControlPayload::GoAway(p), info)
                }
                Err(e) => {
                    errors.push(e);
                    (ControlPayload::Unknown(7), None)
                }
            },
            FrameKind::WindowUpdate => match parse_window_update(payload) {
                Ok(p) => {
                    let info = Some(format!("WINDOW_UPDATE[{}] +{}", p.stream_id, p.delta));
                    (ControlPayload::WindowUpdate(p), info)
                }
                Err(e) => {
                    errors.push(e);
                    (ControlPayload::Unknown(9), None)
                }
            },
            FrameKind::Credential => (ControlPayload::Credential, Some("CREDENTIAL".to_string())),
            FrameKind::Data => unreachable!("control bit implies a non-DATA frame kind"),
        };
        (FramePayload::Control { version, payload: control }, info)
    }

    /// Consult the per-frame memo before ever touching `inflater_direction`'s
    /// inflater, preserving the idempotent-replay invariant.
    fn decode_header_block(
        &mut self,
        frame_index: u64,
        stream_id: u32,
        kind: FrameKind,
        compressed: &[u8],
        inflater_direction: Direction,
    ) -> (Vec<crate::headers::HeaderPair>, Vec<DecodeError>) {
        if !self.config.decompress_headers {
            return (Vec::new(), Vec::new());
        }

        let mut errors = Vec::new();
        let decompressed = if let Some(cached) = self.memo.get(frame_index, stream_id, kind) {
            if self.config.debug_trace {
                log::debug!(
                    "memo hit for frame_index={frame_index} stream_id={stream_id} kind={kind:?}, inflater untouched"
                );
            }
            cached.to_vec()
        } else {
            if self.config.debug_trace {
                log::debug!(
                    "memo miss for frame_index={frame_index} stream_id={stream_id} kind={kind:?}, inflating on {inflater_direction:?}"
                );
            }
            let inflater = match inflater_direction {
                Direction::Request => &mut self.request_inflate,
                Direction::Reply => &mut self.reply_inflate,
            };
            match inflater.inflate(compressed, self.config.max_header_block_bytes) {
                Ok(bytes) => {
                    if self.config.debug_trace {
                        log::trace!(
                            "inflated {} compressed bytes into {} header-block bytes on {inflater_direction:?}",
                            compressed.len(),
                            bytes.len(),
                        );
                    }
                    self.memo.insert(frame_index, stream_id, kind, bytes.clone());
                    bytes
                }
                Err(e) => {
                    errors.push(e);
                    return (Vec::new(), errors);
                }
            }
        };

        let (pairs, parse_err) = crate::headers::parse_name_value_list(&decompressed);
        if let Some(e) = parse_err {
            errors.push(e);
        }
        (pairs, errors)
    }
}

/// The first-byte heuristic: a control frame's first byte always has the high
/// bit set (`0x80` for version 3), and a DATA frame's first byte is usually
/// `0x00` (the top byte of a small stream id). Anything else is assumed not
/// to be SPDY.
pub fn looks_like_spdy(data: &[u8]) -> bool {
    match data.first() {
        Some(0x00) | Some(0x80) => true,
        _ => false,
    }
}
