use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::translation::chunker::ChunkStrategy;
use crate::translation::concurrency::BackendProfile;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    // @backend: Self-hosted LibreTranslate server
    #[default]
    LibreTranslate,
    // @backend: Local Ollama server
    Ollama,
}

impl BackendKind {
    // @returns: Capitalized backend name
    pub fn display_name(&self) -> &str {
        match self {
            Self::LibreTranslate => "LibreTranslate",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase backend identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::LibreTranslate => "libretranslate".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "libretranslate" | "libre" => Ok(Self::LibreTranslate),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid backend type: {}", s)),
        }
    }
}

/// Backend configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    // @field: Backend type identifier
    #[serde(rename = "type")]
    pub backend_type: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: API key (LibreTranslate instances that require one)
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Model name (Ollama only)
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Max concurrent chunk requests, 0 uses the backend profile
    #[serde(default)]
    pub concurrent_requests: usize,

    // @field: Max chars per chunk, 0 uses the backend profile
    #[serde(default)]
    pub max_chunk_size: usize,
}

impl BackendConfig {
    // @param backend: Backend enum
    // @returns: Backend config with defaults
    pub fn new(backend: BackendKind) -> Self {
        let profile = BackendProfile::for_backend(backend);
        match backend {
            BackendKind::LibreTranslate => Self {
                backend_type: backend.to_lowercase_string(),
                endpoint: default_libretranslate_endpoint(),
                api_key: String::new(),
                model: String::new(),
                timeout_secs: default_timeout_secs(),
                concurrent_requests: profile.max_concurrent_requests,
                max_chunk_size: profile.recommended_chunk_size,
            },
            BackendKind::Ollama => Self {
                backend_type: backend.to_lowercase_string(),
                endpoint: default_ollama_endpoint(),
                api_key: String::new(),
                model: default_ollama_model(),
                timeout_secs: default_ollama_timeout_secs(),
                concurrent_requests: profile.max_concurrent_requests,
                max_chunk_size: profile.recommended_chunk_size,
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation backend to use
    #[serde(default)]
    pub backend: BackendKind,

    /// Available translation backends
    #[serde(default)]
    pub available_backends: Vec<BackendConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all backends
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// How documents are split into chunks
    #[serde(default)]
    pub chunk_strategy: ChunkStrategy,

    /// Retries per chunk after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff between retries in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Whether repeated chunks are answered from memory
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// System prompt template for model backends
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for model backends (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            chunk_strategy: ChunkStrategy::default(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            cache_enabled: default_true(),
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Upper bound for `max_retries`
const MAX_RETRIES_LIMIT: u32 = 20;

/// Upper bound for `retry_backoff_ms`
const MAX_BACKOFF_BASE_MS: u64 = 60_000;

fn default_timeout_secs() -> u64 {
    30
}

fn default_ollama_timeout_secs() -> u64 {
    120 // generation is much slower than a translation server
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_libretranslate_endpoint() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional translator. Translate the following text from {source_language} to {target_language}. Preserve line breaks and formatting. Reply with the translation only.".to_string()
}

impl Config {
    /// Load the configuration from `path`, writing a default one if the file is missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let file = File::open(path).context(format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .context(format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_json =
            serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json).context(format!("Failed to write config to file: {:?}", path))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if crate::language_utils::language_codes_match(&self.source_language, &self.target_language) {
            return Err(anyhow!(
                "Source and target languages must differ (both are '{}')",
                self.source_language
            ));
        }

        // Validate endpoint
        crate::providers::normalize_endpoint(&self.translation.get_endpoint())
            .context(format!("Invalid endpoint for {} backend", self.translation.backend.display_name()))?;

        if self.translation.backend == BackendKind::Ollama && self.translation.get_model().trim().is_empty() {
            return Err(anyhow!("A model name is required for the Ollama backend"));
        }

        let common = &self.translation.common;
        if common.max_retries > MAX_RETRIES_LIMIT {
            return Err(anyhow!(
                "max_retries must be at most {}, got {}",
                MAX_RETRIES_LIMIT,
                common.max_retries
            ));
        }

        if common.retry_backoff_ms > MAX_BACKOFF_BASE_MS {
            return Err(anyhow!(
                "retry_backoff_ms must be at most {}, got {}",
                MAX_BACKOFF_BASE_MS,
                common.retry_backoff_ms
            ));
        }

        if !(0.0..=1.0).contains(&common.temperature) {
            return Err(anyhow!("temperature must be between 0.0 and 1.0, got {}", common.temperature));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "ro".to_string(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Concurrent chunk requests for the active backend
    pub fn optimal_concurrent_requests(&self) -> usize {
        let configured = self
            .get_active_backend_config()
            .map_or(0, |backend_config| backend_config.concurrent_requests);

        BackendProfile::for_backend(self.backend).effective_concurrent_requests(configured)
    }

    /// Maximum chunk size in characters for the active backend
    pub fn get_max_chunk_size(&self) -> usize {
        let configured = self
            .get_active_backend_config()
            .map_or(0, |backend_config| backend_config.max_chunk_size);

        BackendProfile::for_backend(self.backend).effective_chunk_size(configured)
    }

    /// Get the active backend configuration from the available_backends array
    pub fn get_active_backend_config(&self) -> Option<&BackendConfig> {
        self.get_backend_config(self.backend)
    }

    /// Mutable access to the active backend configuration, created with defaults if missing
    pub fn active_backend_config_mut(&mut self) -> &mut BackendConfig {
        let backend_str = self.backend.to_lowercase_string();
        let position = match self
            .available_backends
            .iter()
            .position(|b| b.backend_type == backend_str)
        {
            Some(position) => position,
            None => {
                self.available_backends.push(BackendConfig::new(self.backend));
                self.available_backends.len() - 1
            }
        };

        &mut self.available_backends[position]
    }

    /// Get a specific backend configuration by type
    pub fn get_backend_config(&self, backend: BackendKind) -> Option<&BackendConfig> {
        let backend_str = backend.to_lowercase_string();
        self.available_backends
            .iter()
            .find(|b| b.backend_type == backend_str)
    }

    /// Get the model for the active backend
    pub fn get_model(&self) -> String {
        if let Some(backend_config) = self.get_active_backend_config() {
            if !backend_config.model.is_empty() {
                return backend_config.model.clone();
            }
        }

        match self.backend {
            BackendKind::Ollama => default_ollama_model(),
            BackendKind::LibreTranslate => String::new(),
        }
    }

    /// Get the API key for the active backend
    pub fn get_api_key(&self) -> String {
        self.get_active_backend_config()
            .map(|backend_config| backend_config.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active backend
    pub fn get_endpoint(&self) -> String {
        if let Some(backend_config) = self.get_active_backend_config() {
            if !backend_config.endpoint.is_empty() {
                return backend_config.endpoint.clone();
            }
        }

        // Default fallback based on backend type
        match self.backend {
            BackendKind::LibreTranslate => default_libretranslate_endpoint(),
            BackendKind::Ollama => default_ollama_endpoint(),
        }
    }

    /// Get the request timeout for the active backend
    pub fn get_timeout_secs(&self) -> u64 {
        match self.get_active_backend_config() {
            Some(backend_config) if backend_config.timeout_secs > 0 => backend_config.timeout_secs,
            _ => match self.backend {
                BackendKind::LibreTranslate => default_timeout_secs(),
                BackendKind::Ollama => default_ollama_timeout_secs(),
            },
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            available_backends: vec![
                BackendConfig::new(BackendKind::LibreTranslate),
                BackendConfig::new(BackendKind::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
