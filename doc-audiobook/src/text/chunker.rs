//! Text chunking for TTS processing.

use super::TextChunk;

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 3000;

/// Split normalized text into TTS-sized chunks.
///
/// Every non-blank line is a paragraph. A paragraph that fits in `max_size`
/// characters becomes one chunk; a longer one is hard-split into consecutive
/// `max_size` slices. Paragraphs are never merged, and chunk order follows the
/// text.
pub fn split_into_chunks(text: &str, max_size: usize) -> Vec<TextChunk> {
    let max_size = max_size.max(1);

    text.lines()
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .flat_map(|paragraph| {
            if paragraph.chars().count() <= max_size {
                vec![paragraph.to_string()]
            } else {
                hard_split(paragraph, max_size)
            }
        })
        .enumerate()
        .map(|(chunk_id, text)| TextChunk::new(chunk_id, text))
        .collect()
}

/// Hard split text at exact character positions.
fn hard_split(text: &str, max_length: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_length)
        .map(|piece| piece.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{PARAGRAPH_BREAK, normalize_text};
    use proptest::prelude::*;

    fn texts(chunks: &[TextChunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_one_chunk_per_paragraph() {
        let chunks = split_into_chunks("Hello world.\n\nThis is a test.", DEFAULT_MAX_CHUNK_SIZE);
        assert_eq!(texts(&chunks), vec!["Hello world.", "This is a test."]);
        assert_eq!(chunks[0].chunk_id, 0);
        assert_eq!(chunks[1].chunk_id, 1);
    }

    #[test]
    fn test_short_paragraphs_are_not_merged() {
        let chunks = split_into_chunks("a\nb\nc", 3000);
        assert_eq!(texts(&chunks), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_oversized_paragraph() {
        let paragraph = "x".repeat(7000);
        let chunks = split_into_chunks(&paragraph, 3000);
        let sizes: Vec<usize> = chunks.iter().map(TextChunk::char_len).collect();
        assert_eq!(sizes, vec![3000, 3000, 1000]);
    }

    #[test]
    fn test_split_counts_characters_not_bytes() {
        let paragraph = "é".repeat(5);
        let chunks = split_into_chunks(&paragraph, 2);
        assert_eq!(texts(&chunks), vec!["éé", "éé", "é"]);
    }

    #[test]
    fn test_blank_paragraphs_dropped() {
        let chunks = split_into_chunks("\n\n   \nonly\n\n\t\n", 10);
        assert_eq!(texts(&chunks), vec!["only"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(split_into_chunks("", 3000).is_empty());
    }

    #[test]
    fn test_zero_max_size_is_one() {
        let chunks = split_into_chunks("abc", 0);
        assert_eq!(texts(&chunks), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_hard_split() {
        let parts = hard_split("abcdefghij", 3);
        assert_eq!(parts, vec!["abc", "def", "ghi", "j"]);
    }

    proptest! {
        #[test]
        fn prop_chunks_bounded_and_lossless(
            raw in "[a-z .]{0,40}(\n\n[a-z .]{0,120}){0,6}",
            max in 1usize..60,
        ) {
            let normalized = normalize_text(&raw);
            let chunks = split_into_chunks(&normalized, max);

            for chunk in &chunks {
                prop_assert!(chunk.char_len() <= max);
                prop_assert!(chunk.char_len() > 0);
            }

            // Chunks never straddle a paragraph, so regrouping them by
            // paragraph and rejoining reproduces the normalized text.
            let mut rebuilt = Vec::new();
            let mut remaining = chunks.iter();
            for paragraph in normalized.split(PARAGRAPH_BREAK).filter(|p| !p.is_empty()) {
                let mut joined = String::new();
                while joined.chars().count() < paragraph.chars().count() {
                    match remaining.next() {
                        Some(chunk) => joined.push_str(&chunk.text),
                        None => break,
                    }
                }
                prop_assert_eq!(&joined, paragraph);
                rebuilt.push(joined);
            }
            prop_assert!(remaining.next().is_none());
            prop_assert_eq!(rebuilt.join(PARAGRAPH_BREAK), normalized);
        }

        #[test]
        fn prop_short_paragraphs_stay_whole(
            paragraphs in prop::collection::vec("[a-z][a-z ]{0,30}[a-z]", 1..8),
        ) {
            let text = paragraphs.join(PARAGRAPH_BREAK);
            let chunks = split_into_chunks(&text, 40);
            let expected: Vec<String> = paragraphs.iter().map(|p| p.trim().to_string()).collect();
            let actual: Vec<String> = chunks.into_iter().map(|c| c.text).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
