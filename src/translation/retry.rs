/*!
 * Bounded retry for single-chunk translation.
 */

use log::{debug, warn};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::TranslationBackend;

/// Upper bound for a single backoff wait
const MAX_BACKOFF_MS: u64 = 30_000;

/// How many times a failing chunk is retried and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base backoff in milliseconds, doubled after every failed attempt (0 disables waiting)
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
        }
    }

    /// Policy that retries immediately
    pub fn without_backoff(max_retries: u32) -> Self {
        Self::new(max_retries, 0)
    }

    /// Total number of backend calls allowed for one chunk
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait before the next attempt, given how many attempts already failed
    pub fn backoff_for(&self, failed_attempts: u32) -> Duration {
        if self.backoff_base_ms == 0 || failed_attempts == 0 {
            return Duration::ZERO;
        }

        let exponent = (failed_attempts - 1).min(16);
        let delay_ms = self
            .backoff_base_ms
            .saturating_mul(1u64 << exponent)
            .min(MAX_BACKOFF_MS);

        Duration::from_millis(delay_ms)
    }
}

/// A chunk translated successfully
#[derive(Debug, Clone, PartialEq)]
pub struct RetryOutcome {
    pub text: String,
    /// Backend calls it took, including the successful one
    pub attempts: u32,
}

/// Every attempt for a chunk failed
#[derive(Debug, Clone, PartialEq)]
pub struct RetryExhausted {
    pub attempts: u32,
    pub last_error: ProviderError,
}

/// Translate one chunk, retrying the same text until it succeeds or the policy runs out
pub async fn translate_with_retry(
    backend: &dyn TranslationBackend,
    chunk: &str,
    chunk_index: usize,
    policy: &RetryPolicy,
) -> Result<RetryOutcome, RetryExhausted> {
    let max_attempts = policy.max_attempts();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match backend.translate_chunk(chunk).await {
            Ok(text) => {
                if attempts > 1 {
                    debug!("Chunk {} succeeded on attempt {}", chunk_index, attempts);
                }
                return Ok(RetryOutcome { text, attempts });
            }
            Err(e) if attempts >= max_attempts => {
                warn!(
                    "Chunk {} failed after {} attempt(s), giving up: {}",
                    chunk_index, attempts, e
                );
                return Err(RetryExhausted {
                    attempts,
                    last_error: e,
                });
            }
            Err(e) => {
                let delay = policy.backoff_for(attempts);
                warn!(
                    "Chunk {} attempt {}/{} failed: {}. Retrying in {:?}",
                    chunk_index, attempts, max_attempts, e, delay
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
