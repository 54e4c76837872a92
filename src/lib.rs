/*!
 * # doctrans - chunked document translation
 *
 * A Rust library for translating documents of any length through
 * translation backends that only accept bounded input.
 *
 * ## Features
 *
 * - Split documents into size-bounded chunks on line or sentence boundaries
 * - Translate chunks through any backend implementing `TranslationBackend`:
 *   - LibreTranslate (self-hosted translation server)
 *   - Ollama (local LLM server)
 * - Bounded per-chunk retry with exponential backoff
 * - Optional bounded concurrency with order-preserving reassembly
 * - Cooperative cancellation
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: Chunked translation:
 *   - `translation::chunker`: Chunking and reassembly
 *   - `translation::retry`: Bounded retry for a single chunk
 *   - `translation::core`: The `ChunkedTranslator`
 *   - `translation::cache`: Caching of chunk translations
 *   - `translation::concurrency`: Per-backend defaults
 * - `providers`: Backend trait and HTTP adapters:
 *   - `providers::libretranslate`: LibreTranslate API client
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: Scripted backend for tests
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part1};
pub use providers::{FnBackend, TranslationBackend};
pub use translation::{ChunkStrategy, ChunkedTranslator, TranslationOptions};
