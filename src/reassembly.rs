//! Data reassembly: appends DATA payloads, assembles the entity body on FIN,
//! and optionally inflates a gzip/deflate-encoded body.

use flate2::bufread::{DeflateDecoder, GzDecoder};
use std::io::Read;

use crate::error::DecodeError;
use crate::stream::{DataChunk, StreamInfo};

/// What happened to a single DATA frame's payload.
#[derive(Debug, Clone)]
pub enum DataOutcome {
    /// `FIN` was clear; the payload was stored (or just counted) as a partial body.
    Partial,
    /// `FIN` was set: the stream's body is now complete. Carries the delivered
    /// `(content_type, content_type_params, body)` tuple for the body-sink
    /// boundary, plus any body-decompression diagnostic.
    Assembled {
        content_type: Option<String>,
        content_type_params: Option<String>,
        body: Vec<u8>,
        body_error: Option<DecodeError>,
    },
}

/// Cap on a reassembled body's decompressed size. Chosen generously since
/// entity bodies are legitimately larger than a header block.
pub const MAX_DECOMPRESSED_BODY: usize = 16 * 1024 * 1024;

/// Process one DATA frame's payload for `stream`.
///
/// `assemble_entity_bodies` corresponds to the `assemble_entity_bodies` config
/// option: when false, chunks are never retained, only counted, but FIN
/// handling still fires using whatever payload arrived on the terminating frame.
/// `decompress_body` corresponds to `decompress_body`.
pub fn on_data_frame(
    stream: &mut StreamInfo,
    stream_id: u32,
    frame_index: u64,
    payload: &[u8],
    fin: bool,
    assemble_entity_bodies: bool,
    decompress_body: bool,
) -> DataOutcome {
    stream.data_frame_count += 1;

    if !fin {
        if assemble_entity_bodies && !payload.is_empty() {
            stream.data_chunks.push(DataChunk {
                bytes: payload.to_vec(),
                source_frame_index: frame_index,
            });
        }
        return DataOutcome::Partial;
    }

    // FIN set: concatenate whatever chunks are pending plus this frame's payload,
    // avoiding the copy when there is exactly one piece.
    let data_view = if stream.data_chunks.is_empty() {
        payload.to_vec()
    } else if payload.is_empty() && stream.data_chunks.len() == 1 {
        stream.data_chunks[0].bytes.clone()
    } else {
        let total: usize = stream.data_chunks.iter().map(|c| c.bytes.len()).sum::<usize>()
            + payload.len();
        let mut combined = Vec::with_capacity(total);
        for chunk in &stream.data_chunks {
            combined.extend_from_slice(&chunk.bytes);
        }
        combined.extend_from_slice(payload);
        combined
    };

    let (body, body_error) = match stream.content_encoding.as_deref() {
        Some(enc) if decompress_body && enc.eq_ignore_ascii_case("gzip") => {
            match inflate_gzip(&data_view) {
                Ok(decompressed) => (decompressed, None),
                Err(detail) => (
                    data_view.clone(),
                    Some(DecodeError::BodyInflateFailed { stream_id, detail }),
                ),
            }
        }
        Some(enc) if decompress_body && enc.eq_ignore_ascii_case("deflate") => {
            match inflate_deflate(&data_view) {
                Ok(decompressed) => (decompressed, None),
                Err(detail) => (
                    data_view.clone(),
                    Some(DecodeError::BodyInflateFailed { stream_id, detail }),
                ),
            }
        }
        // identity, absent, or any other encoding: passed through unchanged.
        _ => (data_view, None),
    };

    let outcome = DataOutcome::Assembled {
        content_type: stream.content_type.clone(),
        content_type_params: stream.content_type_params.clone(),
        body: body.clone(),
        body_error,
    };

    stream.assembled = Some(body);
    // Chunk storage is kept rather than freed on assembly, so a host can still
    // inspect raw per-frame DATA payloads after the body is complete.
    outcome
}

fn inflate_gzip(data: &[u8]) -> Result<Vec<u8>, String> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(|e| e.to_string())?;
    Ok(out)
}

fn inflate_deflate(data: &[u8]) -> Result<Vec<u8>, String> {
    let mut decoder = DeflateDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(|e| e.to_string())?;
    Ok(out)
}
