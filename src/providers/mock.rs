/*!
 * Mock backend for testing.
 *
 * `MockBackend` simulates the failure modes the chunked translator has to
 * cope with without touching the network:
 * - `MockBackend::working()` - Always succeeds with a tagged translation
 * - `MockBackend::identity()` - Returns every chunk unchanged
 * - `MockBackend::flaky(n)` - Fails each distinct chunk `n` times, then succeeds
 * - `MockBackend::failing()` - Always fails with an error
 * - `MockBackend::empty()` - Succeeds with an empty translation
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::TranslationBackend;

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a tagged translation
    Working,
    /// Returns the chunk unchanged
    Identity,
    /// Fails every Nth request
    Intermittent { fail_every: usize },
    /// Fails each distinct chunk this many times before succeeding
    FlakyPerChunk { failures: usize },
    /// Always fails with an error
    Failing,
    /// Returns an empty translation
    Empty,
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

/// Mock backend for testing translation behavior
#[derive(Debug)]
pub struct MockBackend {
    /// Behavior mode
    behavior: MockBehavior,
    /// Target language used in tagged output
    target_language: String,
    /// Chunks containing this text always fail, regardless of behavior
    fail_when_contains: Option<String>,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every chunk received, in call order
    calls: Arc<Mutex<Vec<String>>>,
    /// Failures served so far per chunk text
    failures_by_chunk: Arc<Mutex<HashMap<String, usize>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str) -> String>,
}

impl MockBackend {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            target_language: "ro".to_string(),
            fail_when_contains: None,
            request_count: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures_by_chunk: Arc::new(Mutex::new(HashMap::new())),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn identity() -> Self {
        Self::new(MockBehavior::Identity)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn flaky(failures: usize) -> Self {
        Self::new(MockBehavior::FlakyPerChunk { failures })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Make every chunk containing `needle` fail permanently
    pub fn failing_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_when_contains = Some(needle.into());
        self
    }

    /// Set the language tag used by the working behavior
    pub fn with_target_language(mut self, target_language: impl Into<String>) -> Self {
        self.target_language = target_language.into();
        self
    }

    /// Set a custom response generator for successful calls
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of backend calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Chunks received so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn success(&self, chunk: &str) -> String {
        if let Some(generator) = self.custom_response {
            return generator(chunk);
        }

        match self.behavior {
            MockBehavior::Identity => chunk.to_string(),
            MockBehavior::Empty => String::new(),
            _ => format!("[TRANSLATED to {}] {}", self.target_language, chunk),
        }
    }
}

impl Clone for MockBackend {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            target_language: self.target_language.clone(),
            fail_when_contains: self.fail_when_contains.clone(),
            request_count: Arc::clone(&self.request_count),
            calls: Arc::clone(&self.calls),
            failures_by_chunk: Arc::clone(&self.failures_by_chunk),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    async fn translate_chunk(&self, chunk: &str) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(chunk.to_string());

        if let Some(needle) = &self.fail_when_contains {
            if chunk.contains(needle.as_str()) {
                return Err(ProviderError::ConnectionError(format!(
                    "Simulated permanent failure for chunk containing '{}'",
                    needle
                )));
            }
        }

        match self.behavior {
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    return Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    });
                }
            }
            MockBehavior::FlakyPerChunk { failures } => {
                let mut served = self.failures_by_chunk.lock();
                let entry = served.entry(chunk.to_string()).or_insert(0);
                if *entry < failures {
                    *entry += 1;
                    return Err(ProviderError::RequestFailed(format!(
                        "Simulated transient failure {} of {}",
                        entry, failures
                    )));
                }
            }
            MockBehavior::Failing => {
                return Err(ProviderError::BackendUnavailable(
                    "Simulated backend failure".to_string(),
                ));
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
            }
            MockBehavior::Working | MockBehavior::Identity | MockBehavior::Empty => {}
        }

        Ok(self.success(chunk))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
