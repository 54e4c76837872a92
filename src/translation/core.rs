/*!
 * Core chunked translation.
 *
 * This module contains `ChunkedTranslator`, which splits a document into
 * backend-safe chunks, translates each one through an injected backend with
 * bounded retry, and reassembles the results in source order.
 */

use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::app_config::TranslationConfig;
use crate::errors::{ProviderError, TranslationError};
use crate::providers::TranslationBackend;

use super::chunker::{Chunk, ChunkStrategy, TextChunker};
use super::retry::{RetryPolicy, translate_with_retry};

/// Options for customizing the translation process
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationOptions {
    /// Maximum chunk size in characters
    pub max_chunk_size: usize,

    /// How chunk boundaries are chosen
    pub strategy: ChunkStrategy,

    /// Retries per chunk after the first attempt
    pub max_retries: u32,

    /// Base backoff between retries in milliseconds
    pub retry_backoff_ms: u64,

    /// Maximum number of chunks translated at the same time
    pub max_concurrent_requests: usize,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            strategy: ChunkStrategy::Lines,
            max_retries: 3,
            retry_backoff_ms: 500,
            max_concurrent_requests: 1,
        }
    }
}

impl TranslationOptions {
    /// Build options from the translation section of the configuration
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            max_chunk_size: config.get_max_chunk_size(),
            strategy: config.common.chunk_strategy,
            max_retries: config.common.max_retries,
            retry_backoff_ms: config.common.retry_backoff_ms,
            max_concurrent_requests: config.optimal_concurrent_requests(),
        }
    }

    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    pub fn with_strategy(mut self, strategy: ChunkStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff_ms(mut self, retry_backoff_ms: u64) -> Self {
        self.retry_backoff_ms = retry_backoff_ms;
        self
    }

    pub fn with_max_concurrent_requests(mut self, max_concurrent_requests: usize) -> Self {
        self.max_concurrent_requests = max_concurrent_requests;
        self
    }
}

/// Statistics for a single translation call
#[derive(Debug, Clone)]
pub struct TranslationStats {
    /// Backend name
    pub backend: String,

    /// Number of chunks the document was split into
    pub total_chunks: usize,

    /// Chunks answered without calling the backend (blank chunks)
    pub passthrough_chunks: usize,

    /// Backend calls made, retries included
    pub backend_calls: u64,

    /// Backend calls that were retries of a failed attempt
    pub retries: u64,

    /// Characters in the source document
    pub source_chars: usize,

    /// Characters in the translated document
    pub translated_chars: usize,

    /// Wall-clock time of the call
    pub elapsed: Duration,
}

impl TranslationStats {
    fn new(backend: &str) -> Self {
        Self {
            backend: backend.to_string(),
            total_chunks: 0,
            passthrough_chunks: 0,
            backend_calls: 0,
            retries: 0,
            source_chars: 0,
            translated_chars: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Generate a summary of the translation run
    pub fn summary(&self) -> String {
        format!(
            "Translation Summary:\n\
             Backend: {}\n\
             Chunks: {} ({} passed through)\n\
             Backend calls: {} ({} retries)\n\
             Characters: {} -> {}\n\
             Elapsed time: {:.2} seconds",
            self.backend,
            self.total_chunks,
            self.passthrough_chunks,
            self.backend_calls,
            self.retries,
            self.source_chars,
            self.translated_chars,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Translated document together with run statistics
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub text: String,
    pub stats: TranslationStats,
}

/// One translated chunk; `attempts` is 0 when the backend was not called
struct TranslatedChunk {
    index: usize,
    text: String,
    attempts: u32,
}

/// Why a chunk stopped the run
enum ChunkStop {
    Failed {
        index: usize,
        attempts: u32,
        error: ProviderError,
    },
    Cancelled,
}

impl ChunkStop {
    fn into_error(self, completed: usize, total: usize) -> TranslationError {
        match self {
            Self::Failed {
                index,
                attempts,
                error,
            } => TranslationError::ChunkTranslationFailed {
                index,
                attempts,
                source: error,
            },
            Self::Cancelled => TranslationError::Cancelled { completed, total },
        }
    }
}

/// Translates documents of any length through a chunk-sized backend
#[derive(Debug, Clone)]
pub struct ChunkedTranslator {
    backend: Arc<dyn TranslationBackend>,
    chunker: TextChunker,
    retry: RetryPolicy,
    options: TranslationOptions,
}

impl ChunkedTranslator {
    /// Create a translator; fails if `max_chunk_size` is 0
    pub fn new(backend: Arc<dyn TranslationBackend>, options: TranslationOptions) -> Result<Self, TranslationError> {
        let chunker = TextChunker::new(options.max_chunk_size, options.strategy)?;
        let retry = RetryPolicy::new(options.max_retries, options.retry_backoff_ms);

        Ok(Self {
            backend,
            chunker,
            retry,
            options,
        })
    }

    pub fn options(&self) -> &TranslationOptions {
        &self.options
    }

    pub fn backend(&self) -> &Arc<dyn TranslationBackend> {
        &self.backend
    }

    /// The chunks `translate` would send for this text
    pub fn chunks(&self, text: &str) -> Vec<Chunk> {
        self.chunker.split(text)
    }

    /// Test the connection to the backend
    pub async fn test_connection(&self) -> Result<(), TranslationError> {
        self.backend.test_connection().await?;
        Ok(())
    }

    /// Translate a whole document
    pub async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        Ok(self.translate_detailed(text, |_, _| {}, None).await?.text)
    }

    /// Translate a document, reporting `(completed, total)` chunks as they finish
    pub async fn translate_with_progress<P>(&self, text: &str, progress: P) -> Result<String, TranslationError>
    where
        P: Fn(usize, usize) + Send + Sync,
    {
        Ok(self.translate_detailed(text, progress, None).await?.text)
    }

    /// Translate a document, stopping cleanly once `cancel` fires
    pub async fn translate_cancellable(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<String, TranslationError> {
        Ok(self.translate_detailed(text, |_, _| {}, Some(cancel)).await?.text)
    }

    /// Translate a document and return run statistics alongside the text
    ///
    /// Either every chunk is translated or an error is returned; partial
    /// output is never handed back.
    pub async fn translate_detailed<P>(
        &self,
        text: &str,
        progress: P,
        cancel: Option<&CancellationToken>,
    ) -> Result<TranslationOutcome, TranslationError>
    where
        P: Fn(usize, usize) + Send + Sync,
    {
        let start_time = Instant::now();
        let mut stats = TranslationStats::new(self.backend.name());

        if text.is_empty() {
            return Ok(TranslationOutcome {
                text: String::new(),
                stats,
            });
        }

        let chunks = self.chunker.split(text);
        let total = chunks.len();
        stats.total_chunks = total;
        stats.source_chars = text.chars().count();

        debug!(
            "Split {} characters into {} chunk(s) of at most {} ({} strategy)",
            stats.source_chars,
            total,
            self.chunker.max_chunk_size(),
            self.chunker.strategy()
        );

        let completed = AtomicUsize::new(0);
        let concurrency = self.options.max_concurrent_requests.max(1);

        let mut translated = if concurrency == 1 {
            let mut translated = Vec::with_capacity(total);
            for chunk in &chunks {
                let piece = self
                    .translate_one(chunk, cancel)
                    .await
                    .map_err(|stop| stop.into_error(completed.load(Ordering::SeqCst), total))?;
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                progress(done, total);
                translated.push(piece);
            }
            translated
        } else {
            let completed_ref = &completed;
            let progress_ref = &progress;

            stream::iter(chunks.iter())
                .map(move |chunk| async move {
                    let piece = self.translate_one(chunk, cancel).await?;
                    let done = completed_ref.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_ref(done, total);
                    Ok::<_, ChunkStop>(piece)
                })
                .buffer_unordered(concurrency)
                .try_collect::<Vec<_>>()
                .await
                .map_err(|stop| stop.into_error(completed.load(Ordering::SeqCst), total))?
        };

        // Completion order is arbitrary with concurrency; output order is not
        translated.sort_by_key(|piece| piece.index);

        for piece in &translated {
            if piece.attempts == 0 {
                stats.passthrough_chunks += 1;
            }
            stats.backend_calls += u64::from(piece.attempts);
            stats.retries += u64::from(piece.attempts.saturating_sub(1));
        }

        let pieces: Vec<&str> = translated.iter().map(|piece| piece.text.as_str()).collect();
        let output = self.chunker.join(&pieces);

        stats.translated_chars = output.chars().count();
        stats.elapsed = start_time.elapsed();

        info!(
            "Translated {} chunk(s) with {} in {:.2}s ({} retries)",
            total,
            stats.backend,
            stats.elapsed.as_secs_f64(),
            stats.retries
        );

        Ok(TranslationOutcome {
            text: output,
            stats,
        })
    }

    async fn translate_one(
        &self,
        chunk: &Chunk,
        cancel: Option<&CancellationToken>,
    ) -> Result<TranslatedChunk, ChunkStop> {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            return Err(ChunkStop::Cancelled);
        }

        if chunk.is_blank() {
            return Ok(TranslatedChunk {
                index: chunk.index,
                text: chunk.text.clone(),
                attempts: 0,
            });
        }

        let work = translate_with_retry(self.backend.as_ref(), &chunk.text, chunk.index, &self.retry);

        let result = match cancel {
            Some(token) => tokio::select! {
                result = work => result,
                () = token.cancelled() => return Err(ChunkStop::Cancelled),
            },
            None => work.await,
        };

        match result {
            Ok(outcome) => Ok(TranslatedChunk {
                index: chunk.index,
                text: outcome.text,
                attempts: outcome.attempts,
            }),
            Err(exhausted) => Err(ChunkStop::Failed {
                index: chunk.index,
                attempts: exhausted.attempts,
                error: exhausted.last_error,
            }),
        }
    }
}
