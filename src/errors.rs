/*!
 * Error types for the doctrans application.
 *
 * This module contains custom error types for the different layers of the
 * application, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Backend is misconfigured or not reachable at all
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl ProviderError {
    /// Map a non-success HTTP status and body to the closest error kind
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            502..=504 => Self::BackendUnavailable(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors that can occur during chunked translation
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// A chunk kept failing after all retry attempts
    #[error("Chunk {index} failed after {attempts} attempt(s): {source}")]
    ChunkTranslationFailed {
        /// Zero-based index of the failing chunk
        index: usize,
        /// Number of backend calls made for the chunk
        attempts: u32,
        /// Last error reported by the backend
        source: ProviderError,
    },

    /// The configured chunk size cannot hold any text
    #[error("Invalid maximum chunk size {0}: must be at least 1")]
    InvalidChunkSize(usize),

    /// The translation was cancelled before every chunk completed
    #[error("Translation cancelled after {completed} of {total} chunks")]
    Cancelled {
        /// Chunks finished before cancellation
        completed: usize,
        /// Total number of chunks
        total: usize,
    },

    /// Error from the provider outside of the chunk loop
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl TranslationError {
    /// Index of the chunk that failed, if this error is tied to one
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            Self::ChunkTranslationFailed { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Last error reported by the backend, if any
    pub fn last_backend_error(&self) -> Option<&ProviderError> {
        match self {
            Self::ChunkTranslationFailed { source, .. } => Some(source),
            Self::Provider(error) => Some(error),
            _ => None,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Classify an application error by the typed error underneath its context chain
    pub fn classify(error: &anyhow::Error) -> Self {
        if let Some(app_error) = error.downcast_ref::<AppError>() {
            return app_error.clone();
        }
        if let Some(translation_error) = error.downcast_ref::<TranslationError>() {
            return Self::Translation(translation_error.clone());
        }
        if let Some(provider_error) = error.downcast_ref::<ProviderError>() {
            return Self::Provider(provider_error.clone());
        }
        if error.downcast_ref::<std::io::Error>().is_some() {
            return Self::File(format!("{:#}", error));
        }

        Self::Unknown(format!("{:#}", error))
    }

    /// Short label for logs and issue reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Config(_) => "config",
            Self::Provider(_) => "provider",
            Self::Translation(_) => "translation",
            Self::Unknown(_) => "unknown",
        }
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::classify(&error)
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
