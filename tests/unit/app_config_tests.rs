/*!
 * Tests for application configuration
 */

use doctrans::app_config::{BackendConfig, BackendKind, Config, LogLevel};
use doctrans::translation::ChunkStrategy;

use crate::common;

#[test]
fn test_config_default_shouldBeValid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.translation.available_backends.len(), 2);
}

#[test]
fn test_config_serializeDeserialize_shouldKeepValues() {
    let mut config = Config::default();
    config.target_language = "fr".to_string();
    config.translation.backend = BackendKind::Ollama;
    config.translation.common.chunk_strategy = ChunkStrategy::Sentences;
    config.log_level = LogLevel::Debug;

    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.target_language, "fr");
    assert_eq!(parsed.translation.backend, BackendKind::Ollama);
    assert_eq!(parsed.translation.common.chunk_strategy, ChunkStrategy::Sentences);
    assert_eq!(parsed.log_level, LogLevel::Debug);
    assert!(json.contains("\"backend\": \"ollama\""));
    assert!(json.contains("\"chunk_strategy\": \"sentences\""));
}

#[test]
fn test_config_withInvalidLanguage_shouldFailValidation() {
    let mut config = Config::default();
    config.source_language = "invalid".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_withEmptyOllamaModel_shouldFailValidation() {
    let mut config = Config::default();
    config.translation.backend = BackendKind::Ollama;
    config.translation.active_backend_config_mut().model = "   ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_withBadEndpoint_shouldFailValidation() {
    let mut config = Config::default();
    config.translation.active_backend_config_mut().endpoint = "http://".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_translationConfig_withUserOverrides_shouldPreferThem() {
    let mut config = Config::default();
    let backend = config.translation.active_backend_config_mut();
    backend.max_chunk_size = 300;
    backend.concurrent_requests = 1;

    assert_eq!(config.translation.get_max_chunk_size(), 300);
    assert_eq!(config.translation.optimal_concurrent_requests(), 1);
}

#[test]
fn test_translationConfig_withZeroOverrides_shouldUseProfile() {
    let mut config = Config::default();
    let backend = config.translation.active_backend_config_mut();
    backend.max_chunk_size = 0;
    backend.concurrent_requests = 0;

    assert_eq!(config.translation.get_max_chunk_size(), 2000);
    assert_eq!(config.translation.optimal_concurrent_requests(), 4);
}

#[test]
fn test_backendConfig_new_shouldFillDefaults() {
    let libre = BackendConfig::new(BackendKind::LibreTranslate);
    assert_eq!(libre.backend_type, "libretranslate");
    assert_eq!(libre.endpoint, "http://127.0.0.1:5000");
    assert!(libre.model.is_empty());

    let ollama = BackendConfig::new(BackendKind::Ollama);
    assert_eq!(ollama.backend_type, "ollama");
    assert_eq!(ollama.endpoint, "http://localhost:11434");
    assert!(!ollama.model.is_empty());
}

#[test]
fn test_backendKind_display_shouldMatchSerdeName() {
    assert_eq!(BackendKind::LibreTranslate.to_string(), "libretranslate");
    assert_eq!(BackendKind::Ollama.display_name(), "Ollama");
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.target_language, "ro");
    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.source_language, "en");
}

#[test]
fn test_loadOrCreate_withExistingFile_shouldReadIt() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "source_language": "en",
            "target_language": "de",
            "translation": { "backend": "ollama", "common": { "max_retries": 5 } },
            "log_level": "warn"
        }"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.target_language, "de");
    assert_eq!(config.translation.backend, BackendKind::Ollama);
    assert_eq!(config.translation.common.max_retries, 5);
    assert_eq!(config.translation.common.retry_backoff_ms, 1000);
    assert_eq!(config.log_level, LogLevel::Warn);
    // No backend list in the file, so defaults come from the Ollama fallbacks
    assert_eq!(config.translation.get_endpoint(), "http://localhost:11434");
}

#[test]
fn test_loadOrCreate_withMalformedFile_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}
