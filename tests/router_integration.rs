//! Integration tests for the translation router
//!
//! Mock adapters count their invocations so the tests can check which
//! backends were reached, not only what came back.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use translation_router::core::errors::AdapterResult;
use translation_router::{
    Adapter, AdapterError, AdapterHandle, AdapterRegistry, AdapterSettings, Capabilities, Detection,
    LanguageCode, RouterConfig, RouterError, SupportedLanguageEntry, TranslateOptions,
    TranslationRequest, TranslationRouter,
};

// ==================== Test Helpers ====================

#[derive(Default)]
struct MockAdapter {
    id: String,
    failing: AtomicBool,
    panics: bool,
    hangs: bool,
    available: bool,
    batch: bool,
    fail_on: Option<String>,
    detection: Option<Detection>,
    languages: Option<Vec<SupportedLanguageEntry>>,
    pairs: Vec<(String, String)>,
    calls: AtomicUsize,
    language_calls: AtomicUsize,
    batch_sizes: Mutex<Vec<usize>>,
}

impl MockAdapter {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            available: true,
            ..Default::default()
        }
    }

    fn failing(id: &str) -> Self {
        let adapter = Self::new(id);
        adapter.set_failing(true);
        adapter
    }

    fn hanging(id: &str) -> Self {
        Self {
            hangs: true,
            ..Self::new(id)
        }
    }

    fn with_batch(mut self) -> Self {
        self.batch = true;
        self
    }

    fn with_pair(mut self, source: &str, target: &str) -> Self {
        self.pairs.push((source.to_string(), target.to_string()));
        self
    }

    fn with_detection(mut self, language: &str, confidence: f64) -> Self {
        self.detection = Some(Detection::new(language, confidence));
        self
    }

    fn with_languages(mut self, languages: Vec<SupportedLanguageEntry>) -> Self {
        self.languages = Some(languages);
        self
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> AdapterResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panics {
            panic!("mock adapter {} panicked", self.id);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AdapterError::failed(format!("{} is down", self.id)));
        }
        Ok(())
    }

    fn render(&self, text: &str, target: &LanguageCode) -> AdapterResult<String> {
        if self.fail_on.as_deref() == Some(text) {
            return Err(AdapterError::failed(format!("{} cannot translate {}", self.id, text)));
        }
        Ok(format!("[{}:{}] {}", self.id, target, text))
    }
}

#[async_trait]
impl Adapter for MockAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            batch: self.batch,
            detect: self.detection.is_some(),
            languages: self.languages.is_some(),
            pair_check: !self.pairs.is_empty(),
        }
    }

    async fn translate(
        &self,
        text: &str,
        _source: Option<&LanguageCode>,
        target: &LanguageCode,
        _options: &TranslateOptions,
    ) -> AdapterResult<String> {
        self.check()?;
        if self.hangs {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        self.render(text, target)
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        _source: Option<&LanguageCode>,
        target: &LanguageCode,
        _options: &TranslateOptions,
    ) -> AdapterResult<Vec<String>> {
        self.check()?;
        self.batch_sizes.lock().unwrap().push(texts.len());
        texts.iter().map(|text| self.render(text, target)).collect()
    }

    async fn detect_language(&self, _text: &str) -> AdapterResult<Detection> {
        self.check()?;
        self.detection
            .clone()
            .ok_or(AdapterError::Unsupported { operation: "detect_language" })
    }

    async fn supported_languages(&self) -> AdapterResult<Vec<SupportedLanguageEntry>> {
        self.language_calls.fetch_add(1, Ordering::SeqCst);
        self.languages
            .clone()
            .ok_or(AdapterError::Unsupported { operation: "supported_languages" })
    }

    async fn supports_pair(&self, source: &LanguageCode, target: &LanguageCode) -> bool {
        self.pairs
            .iter()
            .any(|(s, t)| s == source.as_str() && t == target.as_str())
    }

    async fn is_available(&self) -> AdapterResult<bool> {
        Ok(self.available)
    }
}

/// Build a router over `adapters`, priorities following the slice order
fn router_with(adapters: &[Arc<MockAdapter>]) -> TranslationRouter {
    router_with_config(RouterConfig::default(), adapters)
}

fn router_with_config(config: RouterConfig, adapters: &[Arc<MockAdapter>]) -> TranslationRouter {
    let mut registry = AdapterRegistry::default();
    for (priority, adapter) in adapters.iter().enumerate() {
        registry.register(adapter.clone(), AdapterSettings::with_priority(priority as i32));
    }
    TranslationRouter::with_memory_cache(config, registry).unwrap()
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ==================== Translate ====================

#[tokio::test]
async fn test_cache_hit_bypasses_adapters() {
    let adapter = Arc::new(MockAdapter::new("primary"));
    let router = router_with(&[adapter.clone()]);

    let first = router.translate_text("Hello", Some("en"), "es").await.unwrap();
    assert_eq!(first, "[primary:es] Hello");

    adapter.set_failing(true);
    let second = router.translate_text("Hello", Some("EN"), "ES").await.unwrap();
    assert_eq!(second, first);
    assert_eq!(adapter.calls(), 1);
}

#[tokio::test]
async fn test_fallback_stops_after_two_attempts() {
    let first = Arc::new(MockAdapter::failing("first"));
    let second = Arc::new(MockAdapter::failing("second"));
    let third = Arc::new(MockAdapter::new("third"));
    let router = router_with(&[first.clone(), second.clone(), third.clone()]);

    let err = router.translate_auto("Hello", "es").await.unwrap_err();
    match err {
        RouterError::Adapter { adapter, source } => {
            assert_eq!(adapter, "second");
            assert_eq!(source, AdapterError::failed("second is down"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 1);
    assert_eq!(third.calls(), 0);
}

#[tokio::test]
async fn test_fallback_to_second_adapter_succeeds() {
    let first = Arc::new(MockAdapter::failing("first"));
    let second = Arc::new(MockAdapter::new("second"));
    let router = router_with(&[first.clone(), second.clone()]);

    let translation = router.translate_auto("Hello", "fr").await.unwrap();
    assert_eq!(translation, "[second:fr] Hello");
    assert_eq!(first.calls(), 1);
}

#[tokio::test]
async fn test_panicking_adapter_counts_as_failure() {
    let exploding = Arc::new(MockAdapter {
        panics: true,
        ..MockAdapter::new("exploding")
    });
    let steady = Arc::new(MockAdapter::new("steady"));
    let router = router_with(&[exploding.clone(), steady.clone()]);

    let translation = router.translate_auto("Hello", "de").await.unwrap();
    assert_eq!(translation, "[steady:de] Hello");
    assert_eq!(exploding.calls(), 1);
}

#[tokio::test]
async fn test_hanging_adapter_times_out_and_falls_back() {
    let config = RouterConfig {
        adapter_timeout_ms: 50,
        ..Default::default()
    };
    let stalled = Arc::new(MockAdapter::hanging("stalled"));
    let steady = Arc::new(MockAdapter::new("steady"));
    let router = router_with_config(config, &[stalled.clone(), steady.clone()]);
    assert_eq!(router.registry().timeout(), Duration::from_millis(50));

    let started = Instant::now();
    let translation = router.translate_auto("Hello", "it").await.unwrap();
    assert_eq!(translation, "[steady:it] Hello");
    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(stalled.calls(), 1);
    assert_eq!(steady.calls(), 1);
}

#[tokio::test]
async fn test_timeouts_count_toward_attempt_limit() {
    let config = RouterConfig {
        adapter_timeout_ms: 50,
        ..Default::default()
    };
    let first = Arc::new(MockAdapter::hanging("first"));
    let second = Arc::new(MockAdapter::hanging("second"));
    let third = Arc::new(MockAdapter::new("third"));
    let router = router_with_config(config, &[first, second, third.clone()]);

    let err = router.translate_auto("Hello", "it").await.unwrap_err();
    match err {
        RouterError::Adapter { adapter, source } => {
            assert_eq!(adapter, "second");
            assert_eq!(source, AdapterError::Timeout { after_ms: 50 });
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(third.calls(), 0);
}

#[tokio::test]
async fn test_no_adapters_available() {
    let router = router_with(&[]);
    let err = router.translate_auto("Hello", "es").await.unwrap_err();
    assert!(matches!(err, RouterError::NoAdaptersAvailable));

    let offline = Arc::new(MockAdapter {
        available: false,
        ..MockAdapter::new("offline")
    });
    let router = router_with(&[offline.clone()]);
    let err = router.translate_auto("Hello", "es").await.unwrap_err();
    assert!(matches!(err, RouterError::NoAdaptersAvailable));
    assert_eq!(offline.calls(), 0);
}

#[tokio::test]
async fn test_empty_text_is_rejected() {
    let adapter = Arc::new(MockAdapter::new("primary"));
    let router = router_with(&[adapter.clone()]);

    assert!(matches!(router.translate_auto("", "es").await, Err(RouterError::EmptyText)));
    assert!(matches!(
        router.translate(&TranslationRequest::new("", "en")).await,
        Err(RouterError::EmptyText)
    ));
    assert!(matches!(router.detect_language("").await, Err(RouterError::EmptyText)));
    assert!(matches!(
        router
            .translate_batch(&texts(&["ok", ""]), None, "es", &TranslateOptions::default())
            .await,
        Err(RouterError::EmptyText)
    ));
    assert_eq!(adapter.calls(), 0);
}

#[tokio::test]
async fn test_pair_filter_prefers_declaring_adapter() {
    let generic = Arc::new(MockAdapter::new("generic"));
    let specialist = Arc::new(MockAdapter::new("specialist").with_pair("en", "fr"));
    let router = router_with(&[generic.clone(), specialist.clone()]);

    let translation = router.translate_text("Hello", Some("en"), "fr").await.unwrap();
    assert_eq!(translation, "[specialist:fr] Hello");
    assert_eq!(generic.calls(), 0);

    // Nobody declares en -> de, so every adapter is a candidate
    let translation = router.translate_text("Hello", Some("en"), "de").await.unwrap();
    assert_eq!(translation, "[generic:de] Hello");
}

#[tokio::test]
async fn test_forced_adapter_option() {
    let first = Arc::new(MockAdapter::new("first"));
    let second = Arc::new(MockAdapter::new("second"));
    let router = router_with(&[first.clone(), second.clone()]);

    let request = TranslationRequest::new("Hello", "it")
        .with_options(TranslateOptions::default().with_adapter("second"));
    assert_eq!(router.translate(&request).await.unwrap(), "[second:it] Hello");
    assert_eq!(first.calls(), 0);

    let request = TranslationRequest::new("Other", "it")
        .with_options(TranslateOptions::default().with_adapter("missing"));
    assert!(matches!(
        router.translate(&request).await,
        Err(RouterError::NoAdaptersAvailable)
    ));
}

#[tokio::test]
async fn test_empty_target_uses_configured_default() {
    let adapter = Arc::new(MockAdapter::new("primary"));
    let router = router_with(&[adapter]);

    let translation = router.translate_auto("Hola", "").await.unwrap();
    assert_eq!(translation, "[primary:en] Hola");
}

// ==================== Batch ====================

#[tokio::test]
async fn test_batch_preserves_order_with_mixed_cache() {
    let adapter = Arc::new(MockAdapter::new("bulk").with_batch());
    let router = router_with(&[adapter.clone()]);

    router.translate_auto("World", "es").await.unwrap();

    let translated = router
        .translate_batch(
            &texts(&["Hello", "World", "Test"]),
            None,
            "es",
            &TranslateOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(
        translated,
        vec!["[bulk:es] Hello", "[bulk:es] World", "[bulk:es] Test"]
    );
    assert_eq!(*adapter.batch_sizes.lock().unwrap(), vec![2]);

    // Every item is now cached individually
    adapter.set_failing(true);
    assert_eq!(router.translate_auto("Test", "es").await.unwrap(), "[bulk:es] Test");
    let again = router
        .translate_batch(&texts(&["Test", "Hello"]), None, "es", &TranslateOptions::default())
        .await
        .unwrap();
    assert_eq!(again, vec!["[bulk:es] Test", "[bulk:es] Hello"]);
}

#[tokio::test]
async fn test_batch_all_cached_makes_no_adapter_calls() {
    let adapter = Arc::new(MockAdapter::new("single"));
    let router = router_with(&[adapter.clone()]);

    router.translate_auto("Hello", "es").await.unwrap();
    router.translate_auto("World", "es").await.unwrap();
    assert_eq!(adapter.calls(), 2);

    let translated = router
        .translate_batch(&texts(&["World", "Hello"]), None, "es", &TranslateOptions::default())
        .await
        .unwrap();
    assert_eq!(translated, vec!["[single:es] World", "[single:es] Hello"]);
    assert_eq!(adapter.calls(), 2);
}

#[tokio::test]
async fn test_batch_loops_single_translate_without_batch_capability() {
    let adapter = Arc::new(MockAdapter::new("single"));
    let router = router_with(&[adapter.clone()]);

    let translated = router
        .translate_batch(&texts(&["a", "b", "c"]), Some("en"), "fr", &TranslateOptions::default())
        .await
        .unwrap();
    assert_eq!(translated.len(), 3);
    assert_eq!(adapter.calls(), 3);
    assert!(adapter.batch_sizes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_failure_caches_nothing() {
    let picky = Arc::new(MockAdapter {
        fail_on: Some("Bad".to_string()),
        ..MockAdapter::new("picky")
    });
    let router = router_with(&[picky.clone()]);

    let err = router
        .translate_batch(&texts(&["Good", "Bad"]), None, "es", &TranslateOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::Adapter { .. }));

    // "Good" succeeded inside the failed attempt but must not have been cached
    picky.set_failing(true);
    assert!(router.translate_auto("Good", "es").await.is_err());
}

#[tokio::test]
async fn test_batch_fails_whole_call_despite_cache_hits() {
    let adapter = Arc::new(MockAdapter::new("flaky"));
    let router = router_with(&[adapter.clone()]);

    router.translate_auto("Hello", "es").await.unwrap();
    adapter.set_failing(true);

    let result = router
        .translate_batch(&texts(&["Hello", "New"]), None, "es", &TranslateOptions::default())
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_empty_batch() {
    let router = router_with(&[]);
    let translated = router
        .translate_batch(&[], None, "es", &TranslateOptions::default())
        .await
        .unwrap();
    assert!(translated.is_empty());
}

// ==================== Detection ====================

#[tokio::test]
async fn test_detection_cache_hit_reports_full_confidence() {
    let detector = Arc::new(MockAdapter::new("detector").with_detection("FR", 0.95));
    let router = router_with(&[detector.clone()]);

    let first = router.detect_language("Bonjour").await.unwrap();
    assert_eq!(first.language.as_str(), "fr");
    assert_eq!(first.confidence, 0.95);

    detector.set_failing(true);
    let second = router.detect_language("Bonjour").await.unwrap();
    assert_eq!(second.language.as_str(), "fr");
    assert_eq!(second.confidence, 1.0);
    assert_eq!(detector.calls(), 1);
}

#[tokio::test]
async fn test_detection_skips_adapter_without_capability() {
    let translator_only = Arc::new(MockAdapter::new("translator"));
    let detector = Arc::new(MockAdapter::new("detector").with_detection("de", 0.8));
    let router = router_with(&[translator_only.clone(), detector.clone()]);

    let detection = router.detect_language("Guten Tag").await.unwrap();
    assert_eq!(detection.language.as_str(), "de");
    assert_eq!(translator_only.calls(), 0);
}

#[tokio::test]
async fn test_missing_detect_capability_consumes_attempts() {
    let a = Arc::new(MockAdapter::new("a"));
    let b = Arc::new(MockAdapter::new("b"));
    let detector = Arc::new(MockAdapter::new("detector").with_detection("de", 0.8));
    let router = router_with(&[a, b, detector.clone()]);

    let err = router.detect_language("Guten Tag").await.unwrap_err();
    assert!(matches!(
        err,
        RouterError::UnsupportedOperation {
            ref adapter,
            operation: "detect_language",
        } if adapter == "b"
    ));
    assert_eq!(detector.calls(), 0);
}

// ==================== Capability queries ====================

#[tokio::test]
async fn test_supports_pair_is_case_insensitive() {
    let adapter = Arc::new(MockAdapter::new("pairs").with_pair("en", "fr"));
    let router = router_with(&[Arc::new(MockAdapter::new("plain")), adapter]);

    assert!(router.supports_pair("en", "fr").await);
    assert!(router.supports_pair("EN", "FR").await);
    assert!(!router.supports_pair("en", "xx").await);
}

#[tokio::test]
async fn test_supported_languages_deduplicates_by_code() {
    let primary = Arc::new(MockAdapter::new("primary").with_languages(vec![
        SupportedLanguageEntry::new("en", "English", ["fr"]),
    ]));
    let secondary = Arc::new(MockAdapter::new("secondary").with_languages(vec![
        SupportedLanguageEntry::new("en", "English (secondary)", ["de", "es"]),
        SupportedLanguageEntry::new("es", "Spanish", ["en"]),
    ]));
    let silent = Arc::new(MockAdapter::new("silent"));
    let router = router_with(&[primary.clone(), secondary.clone(), silent]);

    let languages = router.supported_languages().await.unwrap();
    let codes: Vec<&str> = languages.iter().map(|l| l.code.as_str()).collect();
    assert_eq!(codes, vec!["en", "es"]);
    assert_eq!(languages[0].name, "English");
    assert_eq!(languages[0].targets.iter().collect::<Vec<_>>(), vec!["fr"]);

    // Memoized
    router.supported_languages().await.unwrap();
    assert_eq!(primary.language_calls.load(Ordering::SeqCst), 1);
    assert_eq!(secondary.language_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_supported_languages_memo_is_per_view() {
    let english = Arc::new(MockAdapter::new("english").with_languages(vec![
        SupportedLanguageEntry::new("en", "English", ["fr"]),
    ]));
    let router = router_with(&[english.clone()]);

    let german = Arc::new(MockAdapter::new("german").with_languages(vec![
        SupportedLanguageEntry::new("de", "German", ["en"]),
    ]));
    let view =
        router.with_adapters(vec![AdapterHandle::new(german.clone(), AdapterSettings::default())]);

    let base: Vec<String> =
        router.supported_languages().await.unwrap().into_iter().map(|l| l.code).collect();
    let scoped: Vec<String> =
        view.supported_languages().await.unwrap().into_iter().map(|l| l.code).collect();

    assert_eq!(base, vec!["en"]);
    assert_eq!(scoped, vec!["de"]);

    // Each view keeps its own memo
    router.supported_languages().await.unwrap();
    view.supported_languages().await.unwrap();
    assert_eq!(english.language_calls.load(Ordering::SeqCst), 1);
    assert_eq!(german.language_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_any_adapter_configured() {
    let router = router_with(&[Arc::new(MockAdapter::new("bare"))]);
    assert!(!router.any_adapter_configured());

    let mut registry = AdapterRegistry::default();
    registry.register(
        Arc::new(MockAdapter::new("keyed")),
        AdapterSettings {
            api_key: Some("secret".to_string()),
            ..Default::default()
        },
    );
    let router = TranslationRouter::with_memory_cache(RouterConfig::default(), registry).unwrap();
    assert!(router.any_adapter_configured());
}

// ==================== Adapter override ====================

#[tokio::test]
async fn test_override_takes_precedence_without_resorting() {
    let registered = Arc::new(MockAdapter::new("registered"));
    let router = router_with(&[registered.clone()]);

    let late = Arc::new(MockAdapter::failing("late"));
    let offline = Arc::new(MockAdapter {
        available: false,
        ..MockAdapter::new("offline")
    });
    let early = Arc::new(MockAdapter::new("early"));

    let scoped = router.with_adapters(vec![
        AdapterHandle::new(late.clone(), AdapterSettings::with_priority(10)),
        AdapterHandle::new(offline.clone(), AdapterSettings::default()),
        AdapterHandle::new(early.clone(), AdapterSettings::with_priority(-10)),
    ]);

    let translation = scoped.translate_auto("Hello", "es").await.unwrap();
    assert_eq!(translation, "[early:es] Hello");
    assert_eq!(late.calls(), 1);
    assert_eq!(offline.calls(), 0);
    assert_eq!(registered.calls(), 0);

    let ids: Vec<String> = scoped.adapters().await.into_iter().map(|d| d.adapter_id).collect();
    assert_eq!(ids, vec!["late", "offline", "early"]);

    // The original router is untouched
    let translation = router.translate_auto("Other", "es").await.unwrap();
    assert_eq!(translation, "[registered:es] Other");
}

#[tokio::test]
async fn test_concurrent_views_stay_isolated() {
    let router = router_with(&[]);
    let left = Arc::new(MockAdapter::new("left"));
    let right = Arc::new(MockAdapter::new("right"));

    let left_view =
        router.with_adapters(vec![AdapterHandle::new(left.clone(), AdapterSettings::default())]);
    let right_view =
        router.with_adapters(vec![AdapterHandle::new(right.clone(), AdapterSettings::default())]);

    let (a, b) = tokio::join!(
        left_view.translate_auto("one", "es"),
        right_view.translate_auto("two", "es")
    );

    assert_eq!(a.unwrap(), "[left:es] one");
    assert_eq!(b.unwrap(), "[right:es] two");
    assert_eq!(left.calls(), 1);
    assert_eq!(right.calls(), 1);
}
