//! Translation router with lookaside caching and bounded adapter fallback

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::adapter::{guarded, AdapterHandle};
use crate::core::cache::{
    content_hash, detection_key, languages_key, translation_key, CacheFacade,
};
use crate::core::config::RouterConfig;
use crate::core::errors::{AdapterError, AdapterResult, Result, RouterError};
use crate::core::language::{normalize, LanguageCode};
use crate::core::models::{
    AdapterDescriptor, Detection, SupportedLanguageEntry, TranslateOptions, TranslationRequest,
};
use crate::core::registry::AdapterRegistry;

/// Most adapters tried for one call
pub const MAX_ATTEMPTS: usize = 2;

/// Routes translation and detection calls across registered adapters
#[derive(Debug, Clone)]
pub struct TranslationRouter {
    config: Arc<RouterConfig>,
    registry: AdapterRegistry,
    cache: CacheFacade,
}

impl TranslationRouter {
    /// Create a router over `registry` using `cache` for lookaside storage.
    ///
    /// The registry adopts the configured adapter timeout.
    pub fn new(
        config: RouterConfig,
        registry: AdapterRegistry,
        cache: CacheFacade,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            registry: registry.with_timeout(config.adapter_timeout()),
            config: Arc::new(config),
            cache,
        })
    }

    /// Create a router with an in-memory cache using the configured TTL
    pub fn with_memory_cache(config: RouterConfig, registry: AdapterRegistry) -> Result<Self> {
        let cache = CacheFacade::in_memory(config.cache_ttl());
        Self::new(config, registry, cache)
    }

    /// Create from environment with the built-in adapters
    pub fn from_env() -> Result<Self> {
        let config = RouterConfig::load()?;
        let registry = crate::adapters::builtin_registry(&config)?;
        Self::with_memory_cache(config, registry)
    }

    /// Router view whose adapter universe is replaced by `adapters`.
    ///
    /// The view shares this router's cache and configuration. Other views,
    /// including `self`, keep their own adapters.
    pub fn with_adapters(&self, adapters: Vec<AdapterHandle>) -> Self {
        Self {
            config: Arc::clone(&self.config),
            registry: self.registry.with_override(adapters),
            cache: self.cache.clone(),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &CacheFacade {
        &self.cache
    }

    /// Translate a single request
    pub async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        if request.text.is_empty() {
            return Err(RouterError::EmptyText);
        }

        let source = normalize(request.source_lang.as_deref());
        let target = self.target_code(&request.target_lang);
        let key = translation_key(source.as_ref(), &target, &content_hash(&request.text));

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let candidates = self.candidates(source.as_ref(), &target, &request.options).await;
        let text = request.text.as_str();
        let source = source.as_ref();
        let target = &target;
        let options = &request.options;

        let (adapter, translation) = self
            .dispatch(candidates, "translate", move |handle: AdapterHandle| async move {
                handle.adapter().translate(text, source, target, options).await
            })
            .await?;

        debug!("Caching translation from {} under {}", adapter, key);
        self.cache.put(&key, translation.clone()).await;
        Ok(translation)
    }

    /// Translate `text` with an optional source language
    pub async fn translate_text(
        &self,
        text: &str,
        source_lang: Option<&str>,
        target_lang: &str,
    ) -> Result<String> {
        let mut request = TranslationRequest::new(text, target_lang);
        request.source_lang = source_lang.map(str::to_string);
        self.translate(&request).await
    }

    /// Translate `text` with the source language auto-detected
    pub async fn translate_auto(&self, text: &str, target_lang: &str) -> Result<String> {
        self.translate_text(text, None, target_lang).await
    }

    /// Translate many texts, preserving input order.
    ///
    /// Only texts missing from the cache reach an adapter. If that uncached
    /// group fails on every attempt the whole call fails and nothing from the
    /// failed attempts is cached.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        source_lang: Option<&str>,
        target_lang: &str,
        options: &TranslateOptions,
    ) -> Result<Vec<String>> {
        if texts.iter().any(String::is_empty) {
            return Err(RouterError::EmptyText);
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let source = normalize(source_lang);
        let target = self.target_code(target_lang);

        let mut results: Vec<Option<String>> = Vec::with_capacity(texts.len());
        let mut pending_keys = Vec::new();
        let mut pending_texts = Vec::new();
        let mut pending_slots = Vec::new();

        for (slot, text) in texts.iter().enumerate() {
            let key = translation_key(source.as_ref(), &target, &content_hash(text));
            let cached = self.cache.get(&key).await;
            if cached.is_none() {
                pending_keys.push(key);
                pending_texts.push(text.clone());
                pending_slots.push(slot);
            }
            results.push(cached);
        }

        if pending_texts.is_empty() {
            debug!("All {} batch texts served from cache", texts.len());
            return Ok(results.into_iter().flatten().collect());
        }

        debug!(
            "Batch: {} cached, {} to translate",
            texts.len() - pending_texts.len(),
            pending_texts.len()
        );

        let candidates = self.candidates(source.as_ref(), &target, options).await;
        let batch = pending_texts.as_slice();
        let source = source.as_ref();
        let target = &target;

        let (adapter, translated) = self
            .dispatch(candidates, "translate_batch", move |handle: AdapterHandle| async move {
                translate_group(&handle, batch, source, target, options).await
            })
            .await?;

        debug!("Caching {} batch translations from {}", translated.len(), adapter);
        for ((key, slot), translation) in pending_keys.iter().zip(pending_slots).zip(translated) {
            self.cache.put(key, translation.clone()).await;
            results[slot] = Some(translation);
        }

        Ok(results.into_iter().flatten().collect())
    }

    /// Detect the language of `text`.
    ///
    /// Only the language code is cached, so a cache hit reports confidence 1.0.
    pub async fn detect_language(&self, text: &str) -> Result<Detection> {
        if text.is_empty() {
            return Err(RouterError::EmptyText);
        }

        let key = detection_key(&content_hash(text));
        if let Some(language) = self.cache.get(&key).await {
            return Ok(Detection::new(language, 1.0));
        }

        let candidates = self.registry.list_adapters().await;
        let (adapter, detection) = self
            .dispatch(candidates, "detect_language", move |handle: AdapterHandle| async move {
                if !handle.capabilities().detect {
                    return Err(AdapterError::Unsupported {
                        operation: "detect_language",
                    });
                }
                handle.adapter().detect_language(text).await
            })
            .await?;

        debug!("Caching detection {} from {}", detection.language, adapter);
        self.cache.put(&key, detection.language.to_string()).await;
        Ok(detection)
    }

    /// Languages offered by all available adapters, deduplicated by code.
    ///
    /// The first entry for a code wins, in adapter priority order. The memo
    /// is keyed by this router's adapter universe, so views never share it.
    pub async fn supported_languages(&self) -> Result<Vec<SupportedLanguageEntry>> {
        let registry = self.registry.clone();
        let ids: Vec<String> = registry.universe().iter().map(|h| h.id().to_string()).collect();

        self.cache
            .get_or_compute(&languages_key(&ids), || async move {
                let mut seen = HashSet::new();
                let mut entries = Vec::new();

                for handle in registry.list_adapters().await {
                    if !handle.capabilities().languages {
                        continue;
                    }

                    let timeout = registry.timeout();
                    let listed =
                        guarded(handle.id(), timeout, handle.adapter().supported_languages()).await;
                    match listed {
                        Ok(languages) => {
                            for entry in languages {
                                if seen.insert(entry.code.clone()) {
                                    entries.push(entry);
                                }
                            }
                        }
                        Err(e) => warn!("Adapter {} could not list languages: {}", handle.id(), e),
                    }
                }

                Ok::<_, RouterError>(entries)
            })
            .await
    }

    /// True when any available adapter declares the pair
    pub async fn supports_pair(&self, source_lang: &str, target_lang: &str) -> bool {
        let source = LanguageCode::new(source_lang);
        let target = LanguageCode::new(target_lang);

        for handle in self.registry.list_adapters().await {
            if self.registry.supports_pair(&handle, &source, &target).await {
                return true;
            }
        }
        false
    }

    /// True when any adapter has an API key or base URL configured; no network calls
    pub fn any_adapter_configured(&self) -> bool {
        self.registry.any_configured()
    }

    /// Current adapter snapshot
    pub async fn adapters(&self) -> Vec<AdapterDescriptor> {
        self.registry.descriptors().await
    }

    /// Normalized target, or the configured default when none was given
    fn target_code(&self, target_lang: &str) -> LanguageCode {
        if target_lang.trim().is_empty() {
            LanguageCode::new(&self.config.default_target_language)
        } else {
            LanguageCode::new(target_lang)
        }
    }

    /// Forced adapter if requested, otherwise the pair-filtered list
    async fn candidates(
        &self,
        source: Option<&LanguageCode>,
        target: &LanguageCode,
        options: &TranslateOptions,
    ) -> Vec<AdapterHandle> {
        match options.adapter.as_deref() {
            Some(id) => {
                let forced: Vec<_> = self.registry.find(id).into_iter().collect();
                if forced.is_empty() {
                    warn!("Requested adapter {} is not registered", id);
                }
                forced
            }
            None => self.registry.adapters_for_pair(source, target).await,
        }
    }

    /// Try candidates in order, at most [`MAX_ATTEMPTS`] of them.
    ///
    /// Returns the winning adapter id and its value, or the last failure.
    async fn dispatch<T, F, Fut>(
        &self,
        candidates: Vec<AdapterHandle>,
        operation: &'static str,
        mut call: F,
    ) -> Result<(String, T)>
    where
        F: FnMut(AdapterHandle) -> Fut,
        Fut: Future<Output = AdapterResult<T>>,
    {
        if candidates.is_empty() {
            return Err(RouterError::NoAdaptersAvailable);
        }

        let timeout = self.registry.timeout();
        let mut last_failure = None;

        for (attempt, handle) in candidates.into_iter().take(MAX_ATTEMPTS).enumerate() {
            let id = handle.id().to_string();

            match guarded(&id, timeout, call(handle)).await {
                Ok(value) => {
                    info!("{} succeeded via {} (attempt {})", operation, id, attempt + 1);
                    return Ok((id, value));
                }
                Err(e) => {
                    warn!("{} failed via {} (attempt {}): {}", operation, id, attempt + 1, e);
                    last_failure = Some((id, e));
                }
            }
        }

        match last_failure {
            Some((id, e)) => Err(RouterError::from_adapter(id, e)),
            None => Err(RouterError::NoAdaptersTried),
        }
    }
}

/// Translate a group through one adapter, all or nothing
async fn translate_group(
    handle: &AdapterHandle,
    texts: &[String],
    source: Option<&LanguageCode>,
    target: &LanguageCode,
    options: &TranslateOptions,
) -> AdapterResult<Vec<String>> {
    if handle.capabilities().batch {
        let translated = handle.adapter().translate_batch(texts, source, target, options).await?;
        if translated.len() != texts.len() {
            return Err(AdapterError::InvalidResponse {
                message: format!("expected {} translations, got {}", texts.len(), translated.len()),
            });
        }
        return Ok(translated);
    }

    let mut translated = Vec::with_capacity(texts.len());
    for text in texts {
        translated.push(handle.adapter().translate(text, source, target, options).await?);
    }
    Ok(translated)
}
