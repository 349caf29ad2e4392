//! Per-frame memo: remembers the decompressed header block for a
//! captured frame so that re-decoding it (a display refresh, a second dissection
//! pass) never touches the shared zlib inflate state a second time.
//!
//! Keyed by `(frame_index, stream_id, frame_type)` rather than just `(stream_id,
//! frame_type)`: a direction can carry many HEADERS frames for the same stream
//! over its lifetime, and each one is a distinct captured frame with its own
//! slice of the compressed byte stream.

use std::collections::HashMap;

use crate::frame::FrameKind;
use crate::reassembly::DataOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MemoKey {
    frame_index: u64,
    stream_id: u32,
    kind: FrameKind,
}

/// Owned by the conversation, keyed across the lifetime of the connection.
#[derive(Debug, Clone, Default)]
pub struct HeaderBlockMemo {
    entries: HashMap<MemoKey, Vec<u8>>,
}

impl HeaderBlockMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, frame_index: u64, stream_id: u32, kind: FrameKind) -> Option<&[u8]> {
        self.entries
            .get(&MemoKey { frame_index, stream_id, kind })
            .map(Vec::as_slice)
    }

    /// Invariant: a given captured frame is decoded at most once. Inserting
    /// twice for the same key would indicate the caller re-entered the inflater
    /// despite a hit, so this overwrites rather than silently ignoring — callers
    /// are expected to check `get` first.
    pub fn insert(&mut self, frame_index: u64, stream_id: u32, kind: FrameKind, bytes: Vec<u8>) {
        self.entries
            .insert(MemoKey { frame_index, stream_id, kind }, bytes);
    }
}

/// Per-captured-DATA-frame memo, the DATA-path counterpart to
/// [`HeaderBlockMemo`]: replaying the same `frame_index` for a stream must not
/// re-mutate `StreamInfo` a second time (re-push a chunk, double-count
/// `data_frame_count`), so the driver checks here before ever calling
/// `reassembly::on_data_frame` and stores the result for any later replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DataMemoKey {
    frame_index: u64,
    stream_id: u32,
}

#[derive(Debug, Clone, Default)]
pub struct DataFrameMemo {
    entries: HashMap<DataMemoKey, DataOutcome>,
}

impl DataFrameMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, frame_index: u64, stream_id: u32) -> Option<&DataOutcome> {
        self.entries.get(&DataMemoKey { frame_index, stream_id })
    }

    pub fn insert(&mut self, frame_index: u64, stream_id: u32, outcome: DataOutcome) {
        self.entries
            .insert(DataMemoKey { frame_index, stream_id }, outcome);
    }
}
