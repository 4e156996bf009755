//! Response types for processing requests and questions

use serde::{Deserialize, Serialize};

use super::document::Chunk;

/// Marker appended to truncated source previews
pub const ELLIPSIS: &str = "...";

/// A chunk that supported an answer, with its retrieval score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportingChunk {
    pub chunk: Chunk,
    /// Similarity score (higher is more similar)
    pub similarity: f32,
}

/// Answer to a question plus the chunks it was conditioned on, in retrieval order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<SupportingChunk>,
}

impl Answer {
    /// Source previews truncated to `max_chars` characters
    pub fn excerpts(&self, max_chars: usize) -> Vec<SourceExcerpt> {
        self.sources
            .iter()
            .enumerate()
            .map(|(i, source)| SourceExcerpt::from_chunk(i + 1, source, max_chars))
            .collect()
    }
}

/// Display form of a supporting chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceExcerpt {
    /// 1-based position in the answer's source list
    pub rank: usize,
    /// Preview text, ending in `...` when truncated
    pub preview: String,
    pub truncated: bool,
    pub similarity: f32,
}

impl SourceExcerpt {
    pub fn from_chunk(rank: usize, source: &SupportingChunk, max_chars: usize) -> Self {
        let (preview, truncated) = truncate_preview(&source.chunk.content, max_chars);
        Self {
            rank,
            preview,
            truncated,
            similarity: source.similarity,
        }
    }
}

/// Cut `text` to `max_chars` characters, appending `...` when anything was dropped
pub fn truncate_preview(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_end, _)) => (format!("{}{}", &text[..byte_end], ELLIPSIS), true),
        None => (text.to_string(), false),
    }
}

/// Outcome of a document-processing request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingReport {
    /// Files handed to the extractor
    pub files_selected: usize,
    /// Files that yielded usable text
    pub files_extracted: usize,
    /// Chunks embedded into the new index
    pub chunks: usize,
    /// File names of the processed documents
    pub processed_files: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supporting(content: &str) -> SupportingChunk {
        SupportingChunk {
            chunk: Chunk::new(0, content.to_string(), 0, content.chars().count()),
            similarity: 0.5,
        }
    }

    #[test]
    fn test_truncate_preview() {
        let (short, truncated) = truncate_preview("short text", 500);
        assert_eq!(short, "short text");
        assert!(!truncated);

        let long = "x".repeat(600);
        let (preview, truncated) = truncate_preview(&long, 500);
        assert!(truncated);
        assert_eq!(preview.chars().count(), 503);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_truncate_preview_multibyte() {
        let text = "é".repeat(10);
        let (preview, truncated) = truncate_preview(&text, 4);
        assert!(truncated);
        assert_eq!(preview, "éééé...");
    }

    #[test]
    fn test_excerpts_are_ranked_in_order() {
        let answer = Answer {
            text: "42".to_string(),
            sources: vec![supporting("first"), supporting(&"y".repeat(20))],
        };

        let excerpts = answer.excerpts(10);
        assert_eq!(excerpts.len(), 2);
        assert_eq!(excerpts[0].rank, 1);
        assert_eq!(excerpts[0].preview, "first");
        assert!(!excerpts[0].truncated);
        assert_eq!(excerpts[1].rank, 2);
        assert!(excerpts[1].truncated);
    }
}
