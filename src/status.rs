//! Enumerated status/id codes used by RST_STREAM, SETTINGS, and GOAWAY.

/// RST_STREAM status codes. `Unknown` preserves the raw value: an unrecognised
/// status is reported but not fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RstStatus {
    ProtocolError,
    InvalidStream,
    RefusedStream,
    UnsupportedVersion,
    Cancel,
    InternalError,
    FlowControlError,
    StreamInUse,
    StreamAlreadyClosed,
    InvalidCredentials,
    FrameTooLarge,
    Unknown(u32),
}

impl RstStatus {
    pub fn from_u32(v: u32) -> Self {
        match v {
            1 => RstStatus::ProtocolError,
            2 => RstStatus::InvalidStream,
            3 => RstStatus::RefusedStream,
            4 => RstStatus::UnsupportedVersion,
            5 => RstStatus::Cancel,
            6 => RstStatus::InternalError,
            7 => RstStatus::FlowControlError,
            8 => RstStatus::StreamInUse,
            9 => RstStatus::StreamAlreadyClosed,
            10 => RstStatus::InvalidCredentials,
            11 => RstStatus::FrameTooLarge,
            other => RstStatus::Unknown(other),
        }
    }
}

/// GOAWAY status codes. SPDY/3 defines a small subset of RST_STREAM's status
/// space; anything else is preserved verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoAwayStatus {
    Ok,
    ProtocolError,
    InternalError,
    Unknown(u32),
}

impl GoAwayStatus {
    pub fn from_u32(v: u32) -> Self {
        match v {
            0 => GoAwayStatus::Ok,
            1 => GoAwayStatus::ProtocolError,
            11 => GoAwayStatus::InternalError,
            other => GoAwayStatus::Unknown(other),
        }
    }
}

/// Recognised SETTINGS identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingId {
    UploadBandwidth,
    DownloadBandwidth,
    RoundTripTime,
    MaxConcurrentStreams,
    CurrentCwnd,
    DownloadRetransRate,
    InitialWindowSize,
    Unknown(u32),
}

impl SettingId {
    pub fn from_u32(v: u32) -> Self {
        match v {
            1 => SettingId::UploadBandwidth,
            2 => SettingId::DownloadBandwidth,
            3 => SettingId::RoundTripTime,
            4 => SettingId::MaxConcurrentStreams,
            5 => SettingId::CurrentCwnd,
            6 => SettingId::DownloadRetransRate,
            7 => SettingId::InitialWindowSize,
            other => SettingId::Unknown(other),
        }
    }
}

/// A single parsed SETTINGS entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingEntry {
    pub id: SettingId,
    pub value: u32,
    pub persist_value: bool,
    pub persisted: bool,
}
