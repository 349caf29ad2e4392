//! Decode records: the structured, per-frame output this crate hands to display
//! and programmatic taps (sum types over tag+union).

use crate::error::DecodeError;
use crate::headers::HeaderPair;
use crate::payload::{GoAwayPayload, PingPayload, RstStreamPayload, SettingsPayload, WindowUpdatePayload};
use crate::reassembly::DataOutcome;

/// A fully decoded control-frame payload, discriminated by kind rather than
/// carried as a flat record of optional fields.
#[derive(Debug, Clone)]
pub enum ControlPayload {
    SynStream {
        stream_id: u32,
        assoc_stream_id: u32,
        priority: u8,
        slot: u8,
        unidirectional: bool,
        headers: Vec<HeaderPair>,
        info: Option<String>,
    },
    SynReply {
        stream_id: u32,
        headers: Vec<HeaderPair>,
        info: Option<String>,
    },
    Headers {
        stream_id: u32,
        headers: Vec<HeaderPair>,
    },
    RstStream(RstStreamPayload),
    Settings(SettingsPayload),
    Ping(PingPayload),
    GoAway(GoAwayPayload),
    WindowUpdate(WindowUpdatePayload),
    Noop,
    Credential,
    /// A control frame type outside the enumerated set: structurally
    /// parsed (8-byte header + skipped length) but not interpreted.
    Unknown(u16),
    /// A control frame whose version was below 3: length-skipped without
    /// ever touching compression state.
    UnsupportedVersion,
}

/// A frame descriptor's type-specific payload: data or control, mirroring the
/// wire-level split on the control bit.
#[derive(Debug, Clone)]
pub enum FramePayload {
    Data {
        stream_id: u32,
        fin: bool,
        outcome: DataOutcome,
    },
    Control {
        version: u16,
        payload: ControlPayload,
    },
}

/// One decoded frame, with any diagnostics attached rather than raised: each
/// frame produces exactly one record, errors become annotations on that
/// record, and nothing is silently discarded.
#[derive(Debug, Clone)]
pub struct DecodeRecord {
    pub frame_index: u64,
    pub flags: u8,
    pub length: u32,
    pub payload: FramePayload,
    /// Human-readable summary line, analogous to Wireshark's Info column.
    pub info: Option<String>,
    pub errors: Vec<DecodeError>,
}

impl DecodeRecord {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
