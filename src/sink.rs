//! Collaborator boundaries: traits the core calls outward through
//! instead of owning any registration or rendering logic itself.
//!
//! The core never implements these: a host embeds this crate, implements
//! [`BodySink`] for whatever media-type registry it already has, and wires it
//! up to [`crate::reassembly::DataOutcome::Assembled`] records as they arrive.
//! There is no default registry and no global registration call; subdissection
//! of entity bodies by media type is delegated entirely to the host.

/// Receives a reassembled entity body once a stream's DATA frames are complete.
///
/// Implementations typically dispatch on `content_type` to a table of parsers
/// (JSON, HTML, images, ...); this crate has no opinion on that table's shape.
pub trait BodySink {
    /// `body` has already had any gzip/deflate content-encoding reversed by the
    /// reassembler when `decompress_body` is enabled; it is exactly the bytes
    /// a subdissector would expect to parse as `content_type`.
    fn deliver_body(
        &mut self,
        stream_id: u32,
        content_type: Option<&str>,
        content_type_params: Option<&str>,
        body: &[u8],
    );
}

/// A [`BodySink`] that does nothing, for callers that only care about framing
/// and headers. Also useful as the default in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBodySink;

impl BodySink for NullBodySink {
    fn deliver_body(
        &mut self,
        _stream_id: u32,
        _content_type: Option<&str>,
        _content_type_params: Option<&str>,
        _body: &[u8],
    ) {
    }
}
