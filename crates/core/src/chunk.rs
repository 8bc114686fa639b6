//! Positional text chunking.
//!
//! Splits text every `max_chars` characters with no overlap and no awareness
//! of sentences or paragraphs:
//!
//! ```text
//! max_chars = 4
//!
//! "abcdefghij" -> ["abcd", "efgh", "ij"]
//! ```
//!
//! Lengths are counted in Unicode scalar values, so a multi-byte character is
//! never split across two chunks.

use crate::error::{Error, Result};
use crate::types::Chunk;

/// Default maximum chunk length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1500;

/// Fixed-size, non-overlapping chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    max_chars: usize,
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl TextChunker {
    /// Create a chunker with the given maximum chunk length.
    pub fn new(max_chars: usize) -> Result<Self> {
        if max_chars == 0 {
            return Err(Error::InvalidChunkSize(max_chars));
        }
        Ok(Self { max_chars })
    }

    /// Maximum chunk length in characters.
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Split `text` into ordered chunks.
    ///
    /// Concatenating the returned chunk texts reproduces `text` exactly.
    /// Empty input yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::with_capacity(self.chunk_count(text.chars().count()));
        let mut start = 0;
        let mut count = 0;

        for (offset, _) in text.char_indices() {
            if count == self.max_chars {
                chunks.push(Chunk::new(chunks.len(), &text[start..offset]));
                start = offset;
                count = 0;
            }
            count += 1;
        }

        if start < text.len() {
            chunks.push(Chunk::new(chunks.len(), &text[start..]));
        }

        chunks
    }

    /// Number of chunks produced for a text of `char_len` characters.
    pub fn chunk_count(&self, char_len: usize) -> usize {
        char_len.div_ceil(self.max_chars)
    }
}
