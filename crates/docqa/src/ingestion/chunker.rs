//! Recursive text chunking with exact character overlap

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::Chunk;

/// Boundary kinds, from most to least preferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitLevel {
    Paragraph,
    Sentence,
    Word,
    Character,
}

const SPLIT_LEVELS: [SplitLevel; 4] = [
    SplitLevel::Paragraph,
    SplitLevel::Sentence,
    SplitLevel::Word,
    SplitLevel::Character,
];

impl SplitLevel {
    /// Byte offset in `window` right after its last boundary of this kind
    fn last_break(self, window: &str) -> Option<usize> {
        match self {
            Self::Paragraph => window.rfind("\n\n").map(|pos| pos + 2),
            Self::Sentence => window
                .split_sentence_bound_indices()
                .map(|(pos, _)| pos)
                .filter(|&pos| pos > 0)
                .last(),
            Self::Word => window
                .char_indices()
                .filter(|(_, c)| c.is_whitespace())
                .last()
                .map(|(pos, c)| pos + c.len_utf8()),
            Self::Character => Some(window.len()),
        }
    }
}

/// Text chunker with configurable size and overlap, both in characters.
///
/// Every chunk after the first starts with the last `overlap` characters of
/// its predecessor, so chunk 0 plus each later chunk minus that prefix
/// reproduces the input exactly.
#[derive(Debug, Clone)]
pub struct TextChunker {
    /// Maximum chunk size in characters
    chunk_size: usize,
    /// Characters repeated from the previous chunk
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. `overlap` must be smaller than `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk_size must be > 0".to_string()));
        }
        if overlap >= chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into ordered, overlapping chunks.
    ///
    /// Empty or whitespace-only text yields no chunks.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        // Byte offset of every character, plus the end of the text
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(pos, _)| pos)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = offsets.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let limit = (start + self.chunk_size).min(total);
            let end = if limit == total {
                total
            } else {
                self.find_break(text, &offsets, start, limit)
            };

            chunks.push(Chunk::new(
                chunks.len(),
                text[offsets[start]..offsets[end]].to_string(),
                start,
                end,
            ));

            if end == total {
                break;
            }
            start = end - self.overlap;
        }

        tracing::debug!(
            "Split {} characters into {} chunks (size {}, overlap {})",
            total,
            chunks.len(),
            self.chunk_size,
            self.overlap
        );
        chunks
    }

    /// Pick the end of the chunk starting at `start`, at most `limit`.
    ///
    /// The end must leave room for the overlap so the next chunk starts
    /// strictly after `start`.
    fn find_break(&self, text: &str, offsets: &[usize], start: usize, limit: usize) -> usize {
        let min_end = start + self.overlap + 1;
        let window_start = offsets[start];
        let window = &text[window_start..offsets[limit]];

        SPLIT_LEVELS
            .iter()
            .find_map(|level| {
                level
                    .last_break(window)
                    .map(|pos| char_index(offsets, window_start + pos))
                    .filter(|&end| end >= min_end)
            })
            .unwrap_or(limit)
    }
}

fn char_index(offsets: &[usize], byte_pos: usize) -> usize {
    offsets.binary_search(&byte_pos).unwrap_or_else(|pos| pos)
}

/// Split `text` with a one-off chunker
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    Ok(TextChunker::new(chunk_size, overlap)?.split(text))
}
