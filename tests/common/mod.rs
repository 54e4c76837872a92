/*!
 * Common test utilities for the doctrans test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use doctrans::app_config::Config;
use doctrans::errors::ProviderError;
use doctrans::providers::TranslationBackend;

/// Routes `log` output through the test harness, once per process
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A short multi-paragraph English document
pub fn sample_document() -> String {
    "The quick brown fox jumps over the lazy dog.\n\
     It was a bright cold day in April.\n\
     \n\
     All happy families are alike.\n\
     Call me Ishmael."
        .to_string()
}

/// Default configuration with caching off and retries that never wait
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.translation.common.cache_enabled = false;
    config.translation.common.retry_backoff_ms = 0;
    config
}

/// Backend that wraps every chunk in markers and sleeps longer for earlier chunks
///
/// Chunks are expected to look like `line<N>`; chunk N sleeps `(10 - N) * 10` ms
/// so later chunks finish first when translated concurrently.
#[derive(Debug, Default)]
pub struct ReverseDelayBackend {
    completion_order: Arc<Mutex<Vec<String>>>,
}

impl ReverseDelayBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks in the order their translation finished
    pub fn completion_order(&self) -> Vec<String> {
        self.completion_order.lock().clone()
    }
}

#[async_trait]
impl TranslationBackend for ReverseDelayBackend {
    async fn translate_chunk(&self, chunk: &str) -> Result<String, ProviderError> {
        let position: u64 = chunk
            .trim_start_matches("line")
            .parse()
            .map_err(|_| ProviderError::ParseError(format!("unexpected chunk {:?}", chunk)))?;

        tokio::time::sleep(Duration::from_millis((10 - position.min(9)) * 10)).await;
        self.completion_order.lock().push(chunk.to_string());
        Ok(format!("<{}>", chunk))
    }

    fn name(&self) -> &str {
        "reverse-delay"
    }
}
