//! spdy-sans-io: a minimal, sans-I/O SPDY/3+ frame dissector
//!
//! This crate reconstructs the SPDY framing layer from a sequence of byte
//! buffers arriving on one side of a transport connection, tracks per-stream
//! metadata across frames, decompresses the zlib-compressed header block shared
//! by SYN_STREAM / SYN_REPLY / HEADERS, and reassembles fragmented DATA payloads
//! into whole entity bodies. For every frame it produces a structured
//! [`DecodeRecord`] suitable for display and for programmatic taps.
//!
//! # Features
//!
//! - **Sans-I/O design**: no transport or TLS handling; callers feed raw bytes
//! and own desegmentation scheduling.
//! - **Pure Rust inflate**: header-block and entity-body decompression via
//! `flate2`'s Rust zlib backend, no C bindings.
//! - **Stateful header compression**: a per-direction zlib stream carrying the
//! SPDY/3 preset dictionary across frames, matching real SPDY peers.
//! - **Idempotent re-decode**: a per-captured-frame memo means re-dissecting the
//! same frame (a display refresh, a second pass) never touches the shared
//! inflate state twice.
//!
//! # Quick start
//!
//! ```rust
//! use spdy_sans_io::{Conversation, Config, Direction};
//!
//! let mut conversation = Conversation::new(Config::default());
//!
//! // A PING frame with id 42.
//! let ping = [0x80, 0x03, 0x00, 0x06, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x2A];
//! let outcome = conversation.process(Direction::Request, 1, &ping).unwrap();
//! assert_eq!(outcome.records.len(), 1);
//! ```
//!
//! # Architecture
//!
//! This crate is intentionally minimal. It provides:
//! - Frame parsing (bytes -> decode records)
//! - Header-block decompression and name/value parsing
//! - Per-stream entity-body reassembly
//!
//! It does NOT provide:
//! - TCP/TLS transport (you provide the bytes)
//! - Rendering of decode records into any particular tree/UI model
//! - Subdissection of entity bodies by media type
//! - Sending SPDY, flow control, or concurrent-stream policy

pub mod conversation;
pub mod cursor;
pub mod descriptor;
pub mod dictionary;
pub mod error;
pub mod frame;
pub mod headers;
pub mod inflate;
pub mod memo;
pub mod payload;
pub mod reassembly;
pub mod sink;
pub mod status;
pub mod stream;

pub use conversation::{looks_like_spdy, Config, Conversation, Desegmentation, Direction, ProcessOutcome};
pub use cursor::Cursor;
pub use descriptor::{ControlPayload, DecodeRecord, FramePayload};
pub use dictionary::{dictionary_adler32, preset_dictionary};
pub use error::{DecodeError, ProcessError};
pub use frame::{flags, settings_entry_flags, type_code, FrameHeader, FrameKind, MIN_SUPPORTED_VERSION};
pub use headers::{HeaderPair, RecognisedFields};
pub use payload::{
 GoAwayPayload, PingPayload, RstStreamPayload, SettingsPayload, StreamIdFixed,
 SynStreamFixed, WindowUpdatePayload,
};
pub use reassembly::DataOutcome;
pub use sink::{BodySink, NullBodySink};
pub use status::{GoAwayStatus, RstStatus, SettingEntry, SettingId};
pub use stream::{DataChunk, StreamInfo, StreamRegistry};

/// Default plaintext SPDY port.
pub const DEFAULT_PORT: u16 = 6121;
/// Default TLS port, negotiated via the ALPN/NPN label `"spdy"`.
pub const DEFAULT_TLS_PORT: u16 = 443;
/// The ALPN/NPN protocol label peers negotiate for SPDY over TLS.
pub const ALPN_LABEL: &str = "spdy";
