/*!
 * Backend-specific concurrency tuning.
 *
 * This module provides default concurrency and chunk sizes based on what
 * each backend can handle. User configuration overrides them when set.
 */

use crate::app_config::BackendKind;

/// Backend profile with tuned defaults
#[derive(Debug, Clone, PartialEq)]
pub struct BackendProfile {
    /// Maximum concurrent chunk requests
    pub max_concurrent_requests: usize,
    /// Recommended maximum chunk size in characters
    pub recommended_chunk_size: usize,
}

impl BackendProfile {
    /// Get the profile for a given backend
    pub fn for_backend(backend: BackendKind) -> Self {
        match backend {
            BackendKind::LibreTranslate => Self {
                // Argos models on a local server cope with a few parallel requests
                max_concurrent_requests: 4,
                recommended_chunk_size: 2000,
            },
            BackendKind::Ollama => Self {
                // One model instance, generation is the bottleneck
                max_concurrent_requests: 2,
                recommended_chunk_size: 1000,
            },
        }
    }

    /// Effective concurrency, respecting a non-zero user override
    pub fn effective_concurrent_requests(&self, user_override: usize) -> usize {
        if user_override > 0 {
            user_override
        } else {
            self.max_concurrent_requests
        }
    }

    /// Effective chunk size, respecting a non-zero user override
    pub fn effective_chunk_size(&self, user_override: usize) -> usize {
        if user_override > 0 {
            user_override
        } else {
            self.recommended_chunk_size
        }
    }
}
