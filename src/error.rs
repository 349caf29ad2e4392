//! The single error surface for the crate.
//!
//! `DecodeError` values never abort a [`Conversation`](crate::conversation::Conversation):
//! they are attached to the [`DecodeRecord`](crate::descriptor::DecodeRecord) of the frame
//! that produced them and logged once via [`log::warn!`]. `process()` itself only returns
//! `Err` for caller misuse (an out-of-order `frame_index`), never for malformed wire data.

use crate::conversation::Direction;

/// Something went wrong decoding a single frame or header block.
///
/// Every variant is a structural error that stops processing of the current
/// frame only: the driver still advances by the frame's declared length to
/// resynchronise on the next one.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes remained than a field demanded.
    #[error("truncated while reading {field}: needed {needed} bytes, {available} available")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// A control frame declared a type outside the enumerated set.
    #[error("control frame type {raw_type} is not a recognised SPDY frame type")]
    MalformedType { raw_type: u16 },

    /// A control frame declared a version below 3.
    #[error("unsupported SPDY version {version}, frame skipped without touching compression state")]
    UnsupportedVersion { version: u16 },

    /// A SETTINGS frame's declared entry count doesn't fit its length.
    #[error(
        "malformed SETTINGS: {declared_entries} entries declared but only {available_bytes} payload bytes available"
    )]
    MalformedSettings {
        declared_entries: u32,
        available_bytes: usize,
    },

    /// The decompressed header block's name/value list couldn't be parsed.
    #[error("malformed header block: {reason}")]
    MalformedHeaderBlock { reason: &'static str },

    /// An RST_STREAM frame was shorter than its fixed 8-byte payload.
    #[error("malformed RST_STREAM: {available_bytes} payload bytes available, 8 required")]
    MalformedRstStream { available_bytes: usize },

    /// Header-block decompression failed; the direction's inflater is now poisoned.
    #[error("header decompression failed on the {direction:?} direction: {detail}")]
    InflateFailed { direction: Direction, detail: String },

    /// The peer's compressor asked for a preset dictionary we don't recognise.
    #[error("peer requested dictionary checksum {requested:#010x}, expected {expected:#010x}")]
    DictionaryMismatch { expected: u32, requested: u32 },

    /// Entity-body decompression (gzip/deflate) failed; the compressed bytes are retained.
    #[error("body decompression failed on stream {stream_id}: {detail}")]
    BodyInflateFailed { stream_id: u32, detail: String },

    /// A decompressed header block exceeded the configured size cap.
    #[error("decompressed header block exceeded the {limit}-byte cap")]
    OversizedHeaderBlock { limit: usize },
}

impl DecodeError {
    /// Log this error once, at the point it was produced, independent of `debug_trace`.
    pub(crate) fn log(&self) {
        log::warn!("{self}");
    }
}

/// Errors returned directly by [`Conversation::process`](crate::conversation::Conversation::process)
/// for caller misuse. Malformed wire data is never reported this way — see [`DecodeError`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProcessError {
    /// `frame_index` must be non-decreasing within a single direction.
    #[error(
        "frame_index {got} is not greater than the last index {last} seen on this direction"
    )]
    FrameIndexWentBackwards { last: u64, got: u64 },
}
