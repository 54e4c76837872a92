/*!
 * Chunked document translation.
 *
 * This module contains the functionality for translating documents of any
 * length through backends that only accept bounded input. It is split into
 * several submodules:
 *
 * - `chunker`: Splitting text into size-bounded chunks and joining them back
 * - `retry`: Bounded retry with backoff for a single chunk
 * - `core`: The `ChunkedTranslator` tying chunking, retry, and ordering together
 * - `cache`: Caching of chunk translations
 * - `concurrency`: Per-backend concurrency and chunk size defaults
 */

// Re-export main types for easier usage
pub use self::cache::{CachedBackend, TranslationCache};
pub use self::chunker::{Chunk, ChunkStrategy, TextChunker};
pub use self::concurrency::BackendProfile;
pub use self::core::{ChunkedTranslator, TranslationOptions, TranslationOutcome, TranslationStats};
pub use self::retry::{RetryExhausted, RetryOutcome, RetryPolicy, translate_with_retry};

// Submodules
pub mod cache;
pub mod chunker;
pub mod concurrency;
pub mod core;
pub mod retry;
