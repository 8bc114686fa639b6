//! Property-based tests for chunking and deck ordering.
//!
//! - Reproduction: chunks concatenate back to the input
//! - Bounds: no chunk exceeds the limit, only the last may be shorter
//! - Count: ceil(chars / limit) chunks for non-empty input
//! - Order: one slide per chunk, in chunk order

use autodeck_core::{ModelReply, Pipeline, PipelineConfig, TextChunker};
use proptest::prelude::*;

fn arbitrary_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("(?s).{0,400}").unwrap()
}

proptest! {
    #[test]
    fn prop_chunks_reproduce_input(text in arbitrary_text(), size in 1usize..64) {
        let chunker = TextChunker::new(size).unwrap();
        let chunks = chunker.chunk(&text);

        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        prop_assert_eq!(joined, text);
    }

    #[test]
    fn prop_chunk_lengths_bounded(text in arbitrary_text(), size in 1usize..64) {
        let chunker = TextChunker::new(size).unwrap();
        let chunks = chunker.chunk(&text);

        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.index, i);
            prop_assert!(chunk.char_len() <= size);
            prop_assert!(chunk.char_len() > 0);
            if i + 1 < chunks.len() {
                prop_assert_eq!(chunk.char_len(), size);
            }
        }
    }

    #[test]
    fn prop_chunk_count(text in arbitrary_text(), size in 1usize..64) {
        let chunker = TextChunker::new(size).unwrap();
        let chars = text.chars().count();
        let expected = if chars == 0 { 0 } else { (chars + size - 1) / size };

        prop_assert_eq!(chunker.chunk(&text).len(), expected);
        prop_assert_eq!(chunker.chunk_count(chars), expected);
    }

    #[test]
    fn prop_deck_matches_chunk_order(
        text in "[a-z ]{1,200}".prop_filter("non-blank", |s| !s.trim().is_empty()),
        size in 1usize..32,
        workers in 1usize..5,
    ) {
        let config = PipelineConfig::new().with_chunk_size(size).with_concurrency(workers);
        let pipeline = Pipeline::new(config, |chunk: &str| ModelReply::Success(format!("[{}]", chunk))).unwrap();
        let deck = pipeline.build_deck(&text).unwrap().unwrap();

        let chunks = TextChunker::new(size).unwrap().chunk(&text);
        prop_assert_eq!(deck.len(), chunks.len());
        for (slide, chunk) in deck.slides.iter().zip(&chunks) {
            prop_assert_eq!(&slide.title, &format!("[{}]", chunk.text));
        }
    }
}
