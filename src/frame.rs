//! Frame header parser: decodes the 8-byte common prefix shared by every SPDY
//! frame into a tagged descriptor.

use crate::cursor::Cursor;
use crate::error::DecodeError;

/// SPDY control-frame type codes. DATA has no type code; it is signalled by
/// the control bit being clear.
#[allow(dead_code)]
pub mod type_code {
    pub const SYN_STREAM: u16 = 1;
    pub const SYN_REPLY: u16 = 2;
    pub const RST_STREAM: u16 = 3;
    pub const SETTINGS: u16 = 4;
    pub const NOOP: u16 = 5;
    pub const PING: u16 = 6;
    pub const GOAWAY: u16 = 7;
    pub const HEADERS: u16 = 8;
    pub const WINDOW_UPDATE: u16 = 9;
    pub const CREDENTIAL: u16 = 10;
}

/// Frame flags.
#[allow(dead_code)]
pub mod flags {
    /// DATA, SYN_STREAM, SYN_REPLY, HEADERS.
    pub const FIN: u8 = 0x01;
    /// SYN_STREAM only.
    pub const UNIDIRECTIONAL: u8 = 0x02;
    /// SETTINGS only.
    pub const CLEAR_SETTINGS: u8 = 0x01;
}

/// Per-setting-entry flags inside a SETTINGS payload.
#[allow(dead_code)]
pub mod settings_entry_flags {
    pub const PERSIST_VALUE: u8 = 0x01;
    pub const PERSISTED: u8 = 0x02;
}

/// The minimum control-frame version this dissector accepts.
pub const MIN_SUPPORTED_VERSION: u16 = 3;

/// Tag identifying which kind of frame a header describes.
///
/// `Unknown` carries the raw type code so the caller can still skip the frame's
/// declared length and emit a `MalformedType` diagnostic: parsing the 8-byte
/// header never fails just because the type is unrecognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Data,
    SynStream,
    SynReply,
    RstStream,
    Settings,
    Noop,
    Ping,
    GoAway,
    Headers,
    WindowUpdate,
    Credential,
    Unknown(u16),
}

impl FrameKind {
    fn from_type_code(raw: u16) -> Self {
        match raw {
            type_code::SYN_STREAM => FrameKind::SynStream,
            type_code::SYN_REPLY => FrameKind::SynReply,
            type_code::RST_STREAM => FrameKind::RstStream,
            type_code::SETTINGS => FrameKind::Settings,
            type_code::NOOP => FrameKind::Noop,
            type_code::PING => FrameKind::Ping,
            type_code::GOAWAY => FrameKind::GoAway,
            type_code::HEADERS => FrameKind::Headers,
            type_code::WINDOW_UPDATE => FrameKind::WindowUpdate,
            type_code::CREDENTIAL => FrameKind::Credential,
            other => FrameKind::Unknown(other),
        }
    }

    /// Whether this frame kind carries a header block that must go through
    /// header-block decompression and name/value parsing.
    pub fn carries_header_block(&self) -> bool {
        matches!(
            self,
            FrameKind::SynStream | FrameKind::SynReply | FrameKind::Headers
        )
    }
}

/// A parsed 8-byte SPDY frame header.
#[derive(Debug, Clone)]
pub struct FrameHeader {
    pub control: bool,
    /// `Some` only for control frames.
    pub version: Option<u16>,
    pub kind: FrameKind,
    /// `Some` only for DATA frames; control frames carry their stream id in the payload.
    pub stream_id: Option<u32>,
    pub flags: u8,
    pub length: u32,
}

impl FrameHeader {
    pub const SIZE: usize = 8;

    /// Total size of the frame on the wire, header included.
    pub fn total_size(&self) -> usize {
        Self::SIZE + self.length as usize
    }

    /// Parse the fixed 8-byte common header. Fails only on truncation; an
    /// unrecognised control-frame type still parses structurally.
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(data);
        let word0 = cursor.u32_be().map_err(|_| DecodeError::Truncated {
            field: "frame header",
            needed: Self::SIZE,
            available: data.len(),
        })?;
        let control = (word0 >> 31) & 1 == 1;

        let (version, kind, stream_id) = if control {
            let version = ((word0 >> 16) & 0x7FFF) as u16;
            let raw_type = (word0 & 0xFFFF) as u16;
            (Some(version), FrameKind::from_type_code(raw_type), None)
        } else {
            let stream_id = word0 & 0x7FFF_FFFF;
            (None, FrameKind::Data, Some(stream_id))
        };

        let word1 = cursor.u32_be().map_err(|_| DecodeError::Truncated {
            field: "frame header",
            needed: Self::SIZE,
            available: data.len(),
        })?;
        let flags = (word1 >> 24) as u8;
        let length = word1 & 0x00FF_FFFF;

        Ok(FrameHeader {
            control,
            version,
            kind,
            stream_id,
            flags,
            length,
        })
    }

    pub fn is_fin(&self) -> bool {
        self.flags & flags::FIN != 0
    }

    pub fn is_unidirectional(&self) -> bool {
        self.flags & flags::UNIDIRECTIONAL != 0
    }
}
