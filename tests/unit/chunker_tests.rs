/*!
 * Tests for chunking and reassembly
 */

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;

use doctrans::errors::TranslationError;
use doctrans::translation::{ChunkStrategy, TextChunker};

/// A terminator followed by whitespace inside a chunk means it holds more than one sentence
static INNER_SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s").unwrap());

fn texts(chunker: &TextChunker, text: &str) -> Vec<String> {
    chunker.split(text).into_iter().map(|chunk| chunk.text).collect()
}

/// Random text drawn from letters, spaces, punctuation, newlines, and multibyte chars
fn random_text(rng: &mut StdRng) -> String {
    const ALPHABET: &[char] = &['a', 'b', 'z', ' ', ' ', '.', '!', '\n', '\n', 'ș', 'ă', 'é', '\t'];
    let len = rng.random_range(0..200);
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())])
        .collect()
}

#[test]
fn test_split_withThreeShortLines_shouldGiveOneLinePerChunk() {
    let chunker = TextChunker::new(8, ChunkStrategy::Lines).unwrap();
    assert_eq!(texts(&chunker, "hello\nworld\nfoo"), vec!["hello", "world", "foo"]);
}

#[test]
fn test_split_withRoomForTwoLines_shouldPackGreedily() {
    let chunker = TextChunker::new(10, ChunkStrategy::Lines).unwrap();
    assert_eq!(texts(&chunker, "hello\nworld\nfoo"), vec!["hello", "world\nfoo"]);
}

#[test]
fn test_split_withTextThatFits_shouldReturnSingleChunk() {
    let chunker = TextChunker::new(1000, ChunkStrategy::Sentences).unwrap();
    let text = "One. Two!  Three?\n";
    let chunks = chunker.split(text);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].index, 0);
    assert_eq!(chunks[0].text, text);
}

#[test]
fn test_split_withEmptyText_shouldReturnNoChunks() {
    let chunker = TextChunker::new(5, ChunkStrategy::Lines).unwrap();
    assert!(chunker.split("").is_empty());
}

#[test]
fn test_new_withZeroSize_shouldFail() {
    assert!(matches!(
        TextChunker::new(0, ChunkStrategy::Fixed),
        Err(TranslationError::InvalidChunkSize(0))
    ));
}

#[test]
fn test_split_withOversizedLine_shouldKeepItWhole() {
    let chunker = TextChunker::new(4, ChunkStrategy::Lines).unwrap();
    assert_eq!(texts(&chunker, "ab\nabcdefgh\ncd"), vec!["ab", "abcdefgh", "cd"]);
}

#[test]
fn test_split_withSentences_shouldBreakAfterPunctuation() {
    let chunker = TextChunker::new(12, ChunkStrategy::Sentences).unwrap();
    assert_eq!(
        texts(&chunker, "Hi there. How are you? Fine!"),
        vec!["Hi there.", "How are you?", "Fine!"]
    );
    assert_eq!(chunker.separator(), " ");
}

#[test]
fn test_split_withSentencesAndTrailingNewline_shouldKeepNewline() {
    let chunker = TextChunker::new(12, ChunkStrategy::Sentences).unwrap();
    let text = "Hi there. How are you? Fine!\n";

    let pieces = texts(&chunker, text);

    assert_eq!(pieces, vec!["Hi there.", "How are you?", "Fine!\n"]);
    assert_eq!(chunker.join(&pieces), text);
}

#[test]
fn test_split_withFixedStrategy_shouldCountCharsNotBytes() {
    let chunker = TextChunker::new(3, ChunkStrategy::Fixed).unwrap();
    assert_eq!(texts(&chunker, "șăîâțxy"), vec!["șăî", "âțx", "y"]);
}

#[test]
fn test_chunkIndices_shouldFollowSourceOrder() {
    let chunker = TextChunker::new(2, ChunkStrategy::Lines).unwrap();
    let indices: Vec<usize> = chunker.split("a\nb\nc\nd").iter().map(|chunk| chunk.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn test_linesRoundTrip_withRandomInput_shouldReproduceText() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..500 {
        let text = random_text(&mut rng);
        let max = rng.random_range(1..40);
        let chunker = TextChunker::new(max, ChunkStrategy::Lines).unwrap();
        let chunks = chunker.split(&text);

        for chunk in &chunks {
            // Only a single line may exceed the limit
            assert!(
                chunk.char_len() <= max || !chunk.text.contains('\n'),
                "chunk {:?} exceeds {} and spans several lines",
                chunk.text,
                max
            );
        }

        let pieces: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
        assert_eq!(chunker.join(&pieces), text, "round-trip failed for max {}", max);
    }
}

#[test]
fn test_sentencesRoundTrip_withRandomInput_shouldOnlyCollapseBoundaryWhitespace() {
    let mut rng = StdRng::seed_from_u64(13);

    for _ in 0..500 {
        let text = random_text(&mut rng);
        let max = rng.random_range(1..40);
        let chunker = TextChunker::new(max, ChunkStrategy::Sentences).unwrap();
        let chunks = chunker.split(&text);

        for chunk in &chunks {
            // Only a single sentence may exceed the limit
            assert!(
                chunk.char_len() <= max || !INNER_SENTENCE_BREAK.is_match(chunk.text.trim_end()),
                "chunk {:?} exceeds {} and holds several sentences",
                chunk.text,
                max
            );
        }

        // Walk the source: chunks appear in order, separated by whitespace runs only
        let mut expected = String::new();
        let mut rest = text.as_str();
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                let trimmed = rest.trim_start();
                assert!(trimmed.len() < rest.len(), "no whitespace before chunk {:?}", chunk.text);
                rest = trimmed;
                expected.push(' ');
            }
            assert!(rest.starts_with(&chunk.text), "chunk {:?} not found in order", chunk.text);
            rest = &rest[chunk.text.len()..];
            expected.push_str(&chunk.text);
        }
        assert!(rest.is_empty(), "text {:?} lost its tail {:?}", text, rest);

        let pieces: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
        assert_eq!(chunker.join(&pieces), expected, "round-trip failed for max {}", max);
    }
}

#[test]
fn test_fixedRoundTrip_withRandomInput_shouldRespectLimitExactly() {
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..500 {
        let text = random_text(&mut rng);
        let max = rng.random_range(1..40);
        let chunker = TextChunker::new(max, ChunkStrategy::Fixed).unwrap();
        let chunks = chunker.split(&text);

        assert!(chunks.iter().all(|chunk| chunk.char_len() <= max));
        let pieces: Vec<String> = chunks.into_iter().map(|chunk| chunk.text).collect();
        assert_eq!(chunker.join(&pieces), text);
    }
}

#[test]
fn test_strategy_fromStr_shouldParseNamesAndAliases() {
    assert_eq!("lines".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::Lines);
    assert_eq!("Sentence".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::Sentences);
    assert_eq!("fixed".parse::<ChunkStrategy>().unwrap(), ChunkStrategy::Fixed);
    assert!("words".parse::<ChunkStrategy>().is_err());
}
