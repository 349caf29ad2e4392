//! Header-block decompressor: a per-direction zlib inflater carrying the SPDY
//! preset dictionary across frames.
//!
//! The memoisation that guarantees a given captured frame is decoded at most
//! once lives one layer up, in [`crate::conversation::Conversation`], because it
//! is keyed by frame identity rather than by direction. This module only owns
//! the raw, necessarily-stateful inflater itself.

use flate2::{Decompress, FlushDecompress, Status};

use crate::conversation::Direction;
use crate::dictionary;
use crate::error::DecodeError;

/// Initial output buffer size for a header block.
const INITIAL_HEADER_BUFFER: usize = 16 * 1024;

/// A single direction's zlib inflate state (`request_inflate` / `reply_inflate`).
pub struct HeaderInflater {
    inner: Decompress,
    direction: Direction,
    /// Set once an unrecoverable error occurs. A poisoned inflater is never
    /// reset — resetting would desynchronise from the peer's compressor — it
    /// simply refuses all further decompression for the lifetime of the conversation.
    poisoned: bool,
}

impl HeaderInflater {
    pub fn new(direction: Direction) -> Self {
        Self {
            inner: Decompress::new(true),
            direction,
            poisoned: false,
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Cumulative compressed bytes fed to this inflater so far. Used by the test
    /// suite to assert that a memoised re-decode does not advance the stream.
    pub fn total_in(&self) -> u64 {
        self.inner.total_in()
    }

    /// Decompress `compressed` against this direction's running zlib stream.
    ///
    /// Returns the decompressed bytes on success. On any failure the inflater is
    /// poisoned and every subsequent call returns `InflateFailed` immediately
    /// without touching the underlying zlib stream, since it is no longer
    /// synchronised with the peer's compressor.
    pub fn inflate(&mut self, compressed: &[u8], max_bytes: usize) -> Result<Vec<u8>, DecodeError> {
        if self.poisoned {
            return Err(DecodeError::InflateFailed {
                direction: self.direction,
                detail: "inflater already poisoned by a prior failure on this direction".into(),
            });
        }

        let mut out = Vec::with_capacity(INITIAL_HEADER_BUFFER);
        let mut input = compressed;

        loop {
            if out.len() == out.capacity() {
                let grown = out.capacity().max(INITIAL_HEADER_BUFFER) * 2;
                if grown > max_bytes {
                    if out.capacity() >= max_bytes {
                        self.poisoned = true;
                        return Err(DecodeError::OversizedHeaderBlock { limit: max_bytes });
                    }
                    out.reserve(max_bytes - out.capacity());
                } else {
                    out.reserve(grown - out.capacity());
                }
            }

            let len = out.len();
            let cap = out.capacity();
            out.resize(cap, 0);
            let dst = &mut out[len..];

            let before_in = self.inner.total_in();
            let before_out = self.inner.total_out();

            let status = match self.inner.decompress(input, dst, FlushDecompress::Sync) {
                Ok(status) => status,
                Err(err) => {
                    out.truncate(len);
                    if let Some(requested) = err.needs_dictionary() {
                        if requested != dictionary::dictionary_adler32() {
                            self.poisoned = true;
                            return Err(DecodeError::DictionaryMismatch {
                                expected: dictionary::dictionary_adler32(),
                                requested,
                            });
                        }
                        self.inner
                            .set_dictionary(dictionary::preset_dictionary())
                            .map_err(|e| {
                                self.poisoned = true;
                                DecodeError::InflateFailed {
                                    direction: self.direction,
                                    detail: format!("installing preset dictionary: {e}"),
                                }
                            })?;
                        continue;
                    }
                    self.poisoned = true;
                    return Err(DecodeError::InflateFailed {
                        direction: self.direction,
                        detail: err.to_string(),
                    });
                }
            };

            let consumed = (self.inner.total_in() - before_in) as usize;
            let produced = (self.inner.total_out() - before_out) as usize;
            out.truncate(len + produced);
            input = &input[consumed..];

            match status {
                Status::StreamEnd => return Ok(out),
                Status::Ok => {
                    if input.is_empty() {
                        return Ok(out);
                    }
                    if consumed == 0 && produced == 0 {
                        self.poisoned = true;
                        return Err(DecodeError::InflateFailed {
                            direction: self.direction,
                            detail: "inflater made no progress under sync flush".into(),
                        });
                    }
                }
                Status::BufError => {
                    if out.len() >= max_bytes {
                        self.poisoned = true;
                        return Err(DecodeError::OversizedHeaderBlock { limit: max_bytes });
                    }
                    // Loop again; the top of the loop grows the output buffer.
                }
            }
        }
    }
}
