//! Stream registry: per-conversation map of stream id to stream metadata.

use std::collections::BTreeMap;

/// One accumulated but not-yet-reassembled DATA payload.
#[derive(Debug, Clone)]
pub struct DataChunk {
    pub bytes: Vec<u8>,
    pub source_frame_index: u64,
}

/// Per-stream state tracked across the lifetime of a conversation.
#[derive(Debug, Clone, Default)]
pub struct StreamInfo {
    pub content_type: Option<String>,
    pub content_type_params: Option<String>,
    pub content_encoding: Option<String>,
    pub data_chunks: Vec<DataChunk>,
    pub assembled: Option<Vec<u8>>,
    pub data_frame_count: u32,
}

impl StreamInfo {
    /// Whether `save_stream_info` has already populated this entry (the
    /// stream slot must be empty; violating this is a protocol error).
    fn is_empty(&self) -> bool {
        self.content_type.is_none()
            && self.content_type_params.is_none()
            && self.content_encoding.is_none()
    }

    /// Drop the pending chunk list without touching `assembled` or
    /// `data_frame_count`. Not called automatically after reassembly; chunks
    /// are kept around by default so a host can re-inspect raw DATA payloads
    /// after assembly. Provided as an explicit opt-in, and used by
    /// RST_STREAM handling to drop data no longer worth retaining.
    pub fn release_chunks(&mut self) {
        self.data_chunks.clear();
    }
}

/// Error returned when a caller tries to overwrite an already-populated stream
/// slot. The registry itself never panics or discards data on this path:
/// it is the caller's responsibility to treat this as a protocol error record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("stream {stream_id} already has recorded info; first-writer-wins was violated")]
pub struct AlreadyRegistered {
    pub stream_id: u32,
}

/// Sparse, insertion-ordered map of `stream_id (u31) -> StreamInfo`.
///
/// A `BTreeMap` is used rather than a `HashMap` so that iteration (e.g. for a
/// future "list open streams" collaborator) is deterministic by stream id, which
/// also happens to be arrival order within a direction.
#[derive(Debug, Clone, Default)]
pub struct StreamRegistry {
    streams: BTreeMap<u32, StreamInfo>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register content metadata for `stream_id`, first-writer-wins.
    ///
    /// Called once per stream on the frame that first carries its headers
    /// (SYN_STREAM, or SYN_REPLY for the reply direction). Returns
    /// [`AlreadyRegistered`] if the slot was already populated; the existing
    /// metadata is left untouched either way.
    pub fn save_stream_info(
        &mut self,
        stream_id: u32,
        content_type: Option<String>,
        content_type_params: Option<String>,
        content_encoding: Option<String>,
    ) -> Result<(), AlreadyRegistered> {
        let entry = self.streams.entry(stream_id).or_default();
        if !entry.is_empty() {
            return Err(AlreadyRegistered { stream_id });
        }
        entry.content_type = content_type;
        entry.content_type_params = content_type_params;
        entry.content_encoding = content_encoding;
        Ok(())
    }

    /// Merge additional headers onto an existing stream without requiring the
    /// slot be empty first (HEADERS updates without replacing).
    pub fn update_stream_info(
        &mut self,
        stream_id: u32,
        content_type: Option<String>,
        content_type_params: Option<String>,
        content_encoding: Option<String>,
    ) {
        let entry = self.streams.entry(stream_id).or_default();
        if content_type.is_some() {
            entry.content_type = content_type;
        }
        if content_type_params.is_some() {
            entry.content_type_params = content_type_params;
        }
        if content_encoding.is_some() {
            entry.content_encoding = content_encoding;
        }
    }

    pub fn get_stream_info(&self, stream_id: u32) -> Option<&StreamInfo> {
        self.streams.get(&stream_id)
    }

    /// Create the slot if absent and return a mutable handle: a DATA frame
    /// may be the first thing ever seen for a stream id.
    pub fn stream_mut(&mut self, stream_id: u32) -> &mut StreamInfo {
        self.streams.entry(stream_id).or_default()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}
