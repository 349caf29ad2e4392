//! Name/value list parser: walks a decompressed header block, producing an
//! ordered list of `(name, value)` pairs.

use crate::cursor::Cursor;
use crate::error::DecodeError;

/// A single decoded header pair. Names and values are stored as raw, non-lossy
/// strings via `from_utf8_lossy`: SPDY header blocks are not guaranteed to be
/// valid UTF-8, but display and matching both want `String`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderPair {
    pub name: String,
    pub value: String,
}

impl HeaderPair {
    fn new(name: &[u8], value: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            value: String::from_utf8_lossy(value).into_owned(),
        }
    }
}

/// Parse a decompressed header block into an ordered list of pairs.
///
/// If the declared count `N` exceeds what the block could possibly contain, the
/// whole block is rejected with no pairs emitted. A short read partway through the
/// list returns the pairs successfully parsed so far alongside the truncation error.
pub fn parse_name_value_list(
    block: &[u8],
) -> (Vec<HeaderPair>, Option<DecodeError>) {
    let mut cursor = Cursor::new(block);
    let count = match cursor.u32_be() {
        Ok(n) => n,
        Err(e) => return (Vec::new(), Some(e)),
    };

    // Reject outright only when the declared count couldn't possibly be
    // satisfied even by all-empty name/value pairs (N > remaining bytes). A
    // count that fits that bound but still runs out partway through an entry
    // falls through to the loop below, which returns the pairs parsed so far
    // alongside the truncation error.
    if count as u64 > cursor.remaining() as u64 {
        return (
            Vec::new(),
            Some(DecodeError::MalformedHeaderBlock {
                reason: "declared name/value count exceeds remaining block bytes",
            }),
        );
    }

    let mut pairs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_len = match cursor.u32_be() {
            Ok(n) => n as usize,
            Err(e) => return (pairs, Some(e)),
        };
        let name = match cursor.bytes(name_len) {
            Ok(n) => n,
            Err(e) => return (pairs, Some(e)),
        };
        let value_len = match cursor.u32_be() {
            Ok(n) => n as usize,
            Err(e) => return (pairs, Some(e)),
        };
        let value = match cursor.bytes(value_len) {
            Ok(v) => v,
            Err(e) => return (pairs, Some(e)),
        };
        pairs.push(HeaderPair::new(name, value));
    }

    (pairs, None)
}

/// Fields recognised case-insensitively during post-processing.
#[derive(Debug, Clone, Default)]
pub struct RecognisedFields {
    pub method: Option<String>,
    pub status: Option<String>,
    pub url: Option<String>,
    pub version: Option<String>,
    pub content_type: Option<String>,
    pub content_type_params: Option<String>,
    pub content_encoding: Option<String>,
}

impl RecognisedFields {
    /// Scan `pairs` for the well-known field names, splitting `content-type` on
    /// its first `;` into the bare MIME type and the parameter tail.
    pub fn extract(pairs: &[HeaderPair]) -> Self {
        let mut fields = RecognisedFields::default();
        for pair in pairs {
            match pair.name.to_ascii_lowercase().as_str() {
                "method" => fields.method = Some(pair.value.clone()),
                "status" => fields.status = Some(pair.value.clone()),
                "url" => fields.url = Some(pair.value.clone()),
                "version" => fields.version = Some(pair.value.clone()),
                "content-encoding" => fields.content_encoding = Some(pair.value.to_ascii_lowercase()),
                "content-type" => {
                    let lower = pair.value.to_ascii_lowercase();
                    match lower.split_once(';') {
                        Some((ty, params)) => {
                            fields.content_type = Some(ty.trim().to_string());
                            fields.content_type_params = Some(params.trim().to_string());
                        }
                        None => fields.content_type = Some(lower.trim().to_string()),
                    }
                }
                _ => {}
            }
        }
        fields
    }

    /// The `method url version` info line SYN_STREAM frames display.
    pub fn syn_stream_info(&self) -> Option<String> {
        match (&self.method, &self.url, &self.version) {
            (Some(m), Some(u), Some(v)) => Some(format!("{m} {u} {v}")),
            _ => None,
        }
    }

    /// The `status version` info line SYN_REPLY frames display.
    pub fn syn_reply_info(&self) -> Option<String> {
        match (&self.status, &self.version) {
            (Some(s), Some(v)) => Some(format!("{s} {v}")),
            _ => None,
        }
    }
}
