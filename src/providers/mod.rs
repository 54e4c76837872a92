/*!
 * Translation backends.
 *
 * The chunked translator only knows the `TranslationBackend` trait. This
 * module holds the trait plus the concrete adapters:
 * - LibreTranslate: self-hosted translation server
 * - Ollama: local LLM server prompted to translate
 * - Mock: scripted backend for tests
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use url::Url;

use crate::app_config::{BackendKind, Config};
use crate::errors::ProviderError;
use crate::translation::cache::{CachedBackend, TranslationCache};

/// Common trait for every translation backend
///
/// Implementations translate one chunk at a time from the language pair
/// they were built for. They are explicit handles: callers construct them
/// and share them through an `Arc`.
#[async_trait]
pub trait TranslationBackend: Send + Sync + Debug {
    /// Translate a single chunk
    ///
    /// # Arguments
    /// * `chunk` - Text no longer than the configured chunk size
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate_chunk(&self, chunk: &str) -> Result<String, ProviderError>;

    /// Test the connection to the backend
    async fn test_connection(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Short name used in logs
    fn name(&self) -> &str;
}

/// Backend built from a plain function or closure
pub struct FnBackend<F> {
    name: String,
    func: F,
}

impl<F> FnBackend<F>
where
    F: Fn(&str) -> Result<String, ProviderError> + Send + Sync,
{
    /// Wrap a function as a backend
    pub fn new(func: F) -> Self {
        Self::named("function", func)
    }

    /// Wrap a function as a backend with a custom name
    pub fn named(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnBackend<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnBackend").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F> TranslationBackend for FnBackend<F>
where
    F: Fn(&str) -> Result<String, ProviderError> + Send + Sync,
{
    async fn translate_chunk(&self, chunk: &str) -> Result<String, ProviderError> {
        (self.func)(chunk)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Build the backend selected in the configuration
///
/// The returned handle is wrapped in a cache when caching is enabled.
pub fn build_backend(config: &Config) -> Result<Arc<dyn TranslationBackend>> {
    let translation = &config.translation;
    let endpoint = normalize_endpoint(&translation.get_endpoint())?;
    let timeout_secs = translation.get_timeout_secs();

    let backend: Arc<dyn TranslationBackend> = match translation.backend {
        BackendKind::LibreTranslate => {
            let source = crate::language_utils::normalize_to_part1(&config.source_language)?;
            let target = crate::language_utils::normalize_to_part1(&config.target_language)?;
            let api_key = translation.get_api_key();

            Arc::new(libretranslate::LibreTranslate::new_with_config(
                endpoint,
                source,
                target,
                if api_key.is_empty() { None } else { Some(api_key) },
                timeout_secs,
            ))
        }
        BackendKind::Ollama => {
            let source = crate::language_utils::get_language_name(&config.source_language)?;
            let target = crate::language_utils::get_language_name(&config.target_language)?;
            let system_prompt = translation
                .common
                .system_prompt
                .replace("{source_language}", &source)
                .replace("{target_language}", &target);

            Arc::new(
                ollama::Ollama::new_with_config(endpoint, translation.get_model(), timeout_secs)
                    .with_system_prompt(system_prompt)
                    .with_temperature(translation.common.temperature),
            )
        }
    };

    if translation.common.cache_enabled {
        Ok(Arc::new(CachedBackend::new(
            backend,
            TranslationCache::new(true),
            &config.source_language,
            &config.target_language,
        )))
    } else {
        Ok(backend)
    }
}

/// Turn a configured endpoint into a base URL without a trailing slash
///
/// A missing scheme defaults to `http://`.
pub fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    if url.host_str().is_none() {
        return Err(anyhow!("Invalid host in endpoint: {}", endpoint));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Map a transport-level reqwest failure to a provider error
pub(crate) fn request_error(error: reqwest::Error) -> ProviderError {
    if error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else if error.is_timeout() {
        ProviderError::RequestFailed(format!("request timed out: {}", error))
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

pub mod libretranslate;
pub mod mock;
pub mod ollama;
