use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{TranslationBackend, request_error};

/// Client for a running LibreTranslate server
#[derive(Debug)]
pub struct LibreTranslate {
    /// HTTP client for making requests
    client: Client,
    /// Base URL of the server, without trailing slash
    endpoint: String,
    /// ISO 639-1 source language code
    source_language: String,
    /// ISO 639-1 target language code
    target_language: String,
    /// Optional API key for servers started with `--api-keys`
    api_key: Option<String>,
}

/// Body of `POST /translate`
#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateRequest {
    /// Text to translate
    pub q: String,
    /// Source language code
    pub source: String,
    /// Target language code
    pub target: String,
    /// `text` or `html`
    pub format: String,
    /// API key, when the server requires one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl TranslateRequest {
    pub fn new(q: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            source: source.into(),
            target: target.into(),
            format: "text".to_string(),
            api_key: None,
        }
    }

    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }
}

/// Successful `POST /translate` response
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    #[serde(rename = "translatedText")]
    pub translated_text: String,
}

/// Error body returned by LibreTranslate on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Entry of `GET /languages`
#[derive(Debug, Deserialize)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub targets: Vec<String>,
}

impl LibreTranslate {
    /// Create a client with default timeout and no API key
    pub fn new(
        endpoint: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self::new_with_config(endpoint, source_language, target_language, None, 60)
    }

    /// Create a client with full configuration
    pub fn new_with_config(
        endpoint: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            api_key,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// List languages installed on the server
    pub async fn languages(&self) -> Result<Vec<LanguageInfo>, ProviderError> {
        let url = format!("{}/languages", self.endpoint);
        let response = self.client.get(&url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        response
            .json::<Vec<LanguageInfo>>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }
}

/// Extract the server's message from an error body, falling back to the raw text
fn error_message(body: String) -> String {
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) => body,
    }
}

#[async_trait]
impl TranslationBackend for LibreTranslate {
    async fn translate_chunk(&self, chunk: &str) -> Result<String, ProviderError> {
        let url = format!("{}/translate", self.endpoint);
        let request = TranslateRequest::new(chunk, &self.source_language, &self.target_language)
            .api_key(self.api_key.clone());

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response.text().await.unwrap_or_default());
            error!("LibreTranslate error ({}): {}", status, message);
            return Err(ProviderError::from_status(status.as_u16(), message));
        }

        let parsed = response
            .json::<TranslateResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        debug!(
            "LibreTranslate translated {} chars into {} chars",
            chunk.chars().count(),
            parsed.translated_text.chars().count()
        );

        Ok(parsed.translated_text)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let languages = self.languages().await?;

        let pair_installed = languages.iter().any(|language| {
            language.code == self.source_language
                && (language.targets.is_empty()
                    || language.targets.iter().any(|t| t == &self.target_language))
        });

        if pair_installed {
            Ok(())
        } else {
            Err(ProviderError::BackendUnavailable(format!(
                "language pair {} -> {} is not installed on {}",
                self.source_language, self.target_language, self.endpoint
            )))
        }
    }

    fn name(&self) -> &str {
        "libretranslate"
    }
}
