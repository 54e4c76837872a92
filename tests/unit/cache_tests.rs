/*!
 * Tests for translation cache functionality
 */

use std::sync::Arc;

use doctrans::providers::TranslationBackend;
use doctrans::providers::mock::MockBackend;
use doctrans::translation::cache::{CachedBackend, TranslationCache};
use doctrans::translation::{ChunkedTranslator, TranslationOptions};

#[test]
fn test_cache_new_withDisabled_shouldNeverReturnEntries() {
    let cache = TranslationCache::new(false);
    cache.store("hello", "en", "ro", "salut");

    assert!(cache.get("hello", "en", "ro").is_none());
    assert!(cache.is_empty());
    assert!(!cache.is_enabled());
}

#[test]
fn test_cache_store_withEnabledCache_shouldStoreTranslation() {
    let cache = TranslationCache::new(true);
    cache.store("hello", "en", "ro", "salut");

    assert_eq!(cache.get("hello", "en", "ro"), Some("salut".to_string()));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_cache_get_withDifferentLanguages_shouldReturnNone() {
    let cache = TranslationCache::new(true);
    cache.store("hello", "en", "ro", "salut");

    assert!(cache.get("hello", "de", "ro").is_none());
    assert!(cache.get("hello", "en", "fr").is_none());
}

#[test]
fn test_cache_stats_shouldCountHitsAndMisses() {
    let cache = TranslationCache::new(true);
    cache.store("hello", "en", "ro", "salut");

    cache.get("hello", "en", "ro");
    cache.get("hello", "en", "ro");
    cache.get("bye", "en", "ro");

    let (hits, misses, hit_rate) = cache.stats();
    assert_eq!(hits, 2);
    assert_eq!(misses, 1);
    assert!((hit_rate - 2.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_cache_clear_shouldResetEntriesAndCounters() {
    let cache = TranslationCache::new(true);
    cache.store("hello", "en", "ro", "salut");
    cache.get("hello", "en", "ro");

    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(cache.stats(), (0, 0, 0.0));
}

#[test]
fn test_cache_clone_shouldShareStorage() {
    let cache = TranslationCache::new(true);
    let cloned = cache.clone();
    cloned.store("hello", "en", "ro", "salut");

    assert_eq!(cache.get("hello", "en", "ro"), Some("salut".to_string()));
}

#[tokio::test]
async fn test_cachedBackend_withRepeatedLines_shouldCallBackendOncePerDistinctChunk() {
    let mock = MockBackend::working();
    let cache = TranslationCache::new(true);
    let backend = CachedBackend::new(Arc::new(mock.clone()), cache.clone(), "en", "ro");
    let options = TranslationOptions::default()
        .with_max_chunk_size(6)
        .with_retry_backoff_ms(0);
    let translator = ChunkedTranslator::new(Arc::new(backend), options).unwrap();

    let output = translator
        .translate("Header\nBody 1\nHeader\nBody 2\nHeader")
        .await
        .unwrap();

    assert_eq!(
        output,
        "[TRANSLATED to ro] Header\n[TRANSLATED to ro] Body 1\n[TRANSLATED to ro] Header\n\
         [TRANSLATED to ro] Body 2\n[TRANSLATED to ro] Header"
    );
    assert_eq!(mock.call_count(), 3);
    assert_eq!(cache.stats().0, 2);
}

#[test]
fn test_cachedBackend_withDisabledCache_shouldForwardEveryCall() {
    let mock = MockBackend::identity();
    let backend = CachedBackend::new(Arc::new(mock.clone()), TranslationCache::new(false), "en", "ro");

    let result = tokio_test::block_on(async {
        let first = backend.translate_chunk("same").await?;
        let second = backend.translate_chunk("same").await?;
        Ok::<_, doctrans::errors::ProviderError>((first, second))
    });

    assert_eq!(result.unwrap(), ("same".to_string(), "same".to_string()));
    assert_eq!(mock.call_count(), 2);
}
