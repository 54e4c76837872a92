/*!
 * Text chunking for backend-safe translation requests.
 *
 * A `TextChunker` breaks a document into ordered chunks no longer than a
 * configured number of characters. Boundaries follow the selected
 * `ChunkStrategy`, and every strategy has a fixed separator used to put
 * translated chunks back together.
 */

use anyhow::{Result, anyhow};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::TranslationError;

/// Sentence terminator followed by the whitespace that separates it from the next sentence
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[.!?…]+["'”’»)\]]*\s+"#).unwrap()
});

/// How a document is broken into units before packing them into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStrategy {
    /// Whole lines, joined back with a newline
    #[default]
    Lines,
    /// Sentences, joined back with a single space
    Sentences,
    /// Raw character slices, joined back with nothing
    Fixed,
}

impl ChunkStrategy {
    /// Separator placed between translated chunks on reassembly
    pub fn separator(&self) -> &'static str {
        match self {
            Self::Lines => "\n",
            Self::Sentences => " ",
            Self::Fixed => "",
        }
    }

    /// Lowercase identifier used in configuration and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lines => "lines",
            Self::Sentences => "sentences",
            Self::Fixed => "fixed",
        }
    }
}

impl std::fmt::Display for ChunkStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ChunkStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lines" | "line" => Ok(Self::Lines),
            "sentences" | "sentence" => Ok(Self::Sentences),
            "fixed" | "offset" => Ok(Self::Fixed),
            _ => Err(anyhow!("Invalid chunk strategy: {}", s)),
        }
    }
}

/// A contiguous piece of the source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position of the chunk in the document
    pub index: usize,
    /// Chunk content
    pub text: String,
}

impl Chunk {
    /// Create a chunk
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Length in characters, the unit the size limit is expressed in
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the chunk has nothing worth sending to a backend
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Splits documents into chunks of bounded size
#[derive(Debug, Clone)]
pub struct TextChunker {
    max_chunk_size: usize,
    strategy: ChunkStrategy,
}

impl TextChunker {
    /// Create a chunker; `max_chunk_size` is counted in characters and must be at least 1
    pub fn new(max_chunk_size: usize, strategy: ChunkStrategy) -> Result<Self, TranslationError> {
        if max_chunk_size == 0 {
            return Err(TranslationError::InvalidChunkSize(max_chunk_size));
        }

        Ok(Self {
            max_chunk_size,
            strategy,
        })
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    pub fn strategy(&self) -> ChunkStrategy {
        self.strategy
    }

    pub fn separator(&self) -> &'static str {
        self.strategy.separator()
    }

    /// Split text into ordered chunks.
    ///
    /// Text that already fits is returned as a single chunk. Otherwise units
    /// are packed greedily; a unit that alone exceeds the limit becomes its
    /// own oversized chunk rather than being cut.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        if text.chars().count() <= self.max_chunk_size {
            return vec![Chunk::new(0, text)];
        }

        match self.strategy {
            ChunkStrategy::Lines => self.pack(text, &line_spans(text)),
            ChunkStrategy::Sentences => self.pack(text, &sentence_spans(text)),
            ChunkStrategy::Fixed => self.split_fixed(text),
        }
    }

    /// Join translated pieces with the strategy separator, in the given order
    pub fn join<S: AsRef<str>>(&self, pieces: &[S]) -> String {
        pieces
            .iter()
            .map(|piece| piece.as_ref())
            .collect::<Vec<_>>()
            .join(self.separator())
    }

    /// Greedily pack unit spans (byte ranges into `text`) into chunk ranges.
    ///
    /// A chunk always covers the source text from its first unit to its last,
    /// so whatever lay between two units inside a chunk is kept verbatim.
    fn pack(&self, text: &str, spans: &[(usize, usize)]) -> Vec<Chunk> {
        let mut ranges: Vec<(usize, usize)> = Vec::new();
        // (start, end, chars)
        let mut current: Option<(usize, usize, usize)> = None;

        for &(start, end) in spans {
            current = match current {
                None => Some((start, end, text[start..end].chars().count())),
                Some((chunk_start, chunk_end, chars)) => {
                    let extra = text[chunk_end..end].chars().count();
                    if chars + extra <= self.max_chunk_size {
                        Some((chunk_start, end, chars + extra))
                    } else {
                        ranges.push((chunk_start, chunk_end));
                        Some((start, end, text[start..end].chars().count()))
                    }
                }
            };
        }

        if let Some((start, end, _)) = current {
            ranges.push((start, end));
        }

        ranges
            .into_iter()
            .enumerate()
            .map(|(index, (start, end))| {
                let chunk = Chunk::new(index, &text[start..end]);
                let len = chunk.char_len();
                if len > self.max_chunk_size {
                    warn!(
                        "Chunk {} has {} characters, above the limit of {}: a single {} cannot be split further",
                        index,
                        len,
                        self.max_chunk_size,
                        match self.strategy {
                            ChunkStrategy::Sentences => "sentence",
                            _ => "line",
                        }
                    );
                }
                chunk
            })
            .collect()
    }

    fn split_fixed(&self, text: &str) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut count = 0;

        for ch in text.chars() {
            current.push(ch);
            count += 1;
            if count == self.max_chunk_size {
                chunks.push(Chunk::new(chunks.len(), std::mem::take(&mut current)));
                count = 0;
            }
        }

        if !current.is_empty() {
            chunks.push(Chunk::new(chunks.len(), current));
        }

        chunks
    }
}

/// Byte ranges of every line, excluding the `\n` terminators
fn line_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;

    for line in text.split('\n') {
        let end = start + line.len();
        spans.push((start, end));
        start = end + 1;
    }

    spans
}

/// Byte ranges of every sentence, excluding the whitespace after it.
///
/// Whitespace that ends the text stays with the last sentence.
fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;

    for m in SENTENCE_END.find_iter(text) {
        let end = m.start() + m.as_str().trim_end().len();
        spans.push((start, end));
        start = m.end();
    }

    if start < text.len() {
        spans.push((start, text.len()));
    } else if let Some(last) = spans.last_mut() {
        last.1 = text.len();
    }

    spans
}
