//! Text processing for narration: extraction, normalization, and chunking.

pub mod chunker;
pub mod extract;
mod normalizer;

pub use chunker::{DEFAULT_MAX_CHUNK_SIZE, split_into_chunks};
pub use extract::{DocumentKind, extract_or_warn};
pub use normalizer::normalize_text;

/// Marker separating two paragraphs in normalized text.
pub const PARAGRAPH_BREAK: &str = "\n\n";

/// A chunk of text ready for TTS processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position of this chunk in the narration
    pub chunk_id: usize,
    /// The text content
    pub text: String,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(chunk_id: usize, text: String) -> Self {
        Self { chunk_id, text }
    }

    /// Length of the chunk in characters (not bytes).
    #[cfg(test)]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Whether `text` has anything a voice can pronounce.
///
/// Lines made only of punctuation or symbols, like a `* * *` scene break,
/// produce no speech.
pub fn is_speakable(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}

/// Approximate word count, as reported to the user before conversion.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
