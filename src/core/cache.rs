//! Lookaside cache facade and the default in-memory store

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::core::errors::Result;
use crate::core::language::LanguageCode;

/// Namespace prefix for every key written by the router
pub const KEY_PREFIX: &str = "translation_router";

/// Key-value store with per-entry expiry
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live value
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a value that expires after `ttl`
    async fn put(&self, key: &str, value: String, ttl: Duration);

    /// Drop every entry
    async fn remove_all(&self);
}

/// Default bound on entries held by a [`MemoryCache`]
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &CacheEntry,
        _updated_at: Instant,
        _current: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process store backed by a bounded `moka` cache.
///
/// Expired entries are reclaimed by moka's housekeeping whether or not they
/// are read again; past `max_entries` the least useful entries are evicted.
pub struct MemoryCache {
    entries: Cache<String, CacheEntry>,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_entries)
                .expire_after(EntryTtl)
                .build(),
        }
    }

    /// Number of live entries after pending expirations are applied
    pub async fn len(&self) -> usize {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count() as usize
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).await.map(|entry| entry.value)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) {
        self.entries
            .insert(key.to_string(), CacheEntry { value, ttl })
            .await;
    }

    async fn remove_all(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks().await;
    }
}

/// Cache key kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Translation,
    Detection,
    Languages,
}

impl CacheKind {
    fn tag(self) -> &'static str {
        match self {
            CacheKind::Translation => "t",
            CacheKind::Detection => "lang",
            CacheKind::Languages => "languages",
        }
    }
}

/// Stable hex digest of the text
pub fn content_hash(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

/// Key for a translation of `hash` from `source` (or auto) into `target`
pub fn translation_key(
    source: Option<&LanguageCode>,
    target: &LanguageCode,
    hash: &str,
) -> String {
    let source = source.map(LanguageCode::as_str).unwrap_or("auto");
    format!(
        "{}:{}:{}:{}:{}",
        KEY_PREFIX,
        CacheKind::Translation.tag(),
        source,
        target,
        hash
    )
}

/// Key for a detected language of `hash`
pub fn detection_key(hash: &str) -> String {
    format!("{}:{}:{}", KEY_PREFIX, CacheKind::Detection.tag(), hash)
}

/// Key for the supported-languages view over the adapters `adapter_ids`
pub fn languages_key<S: AsRef<str>>(adapter_ids: &[S]) -> String {
    let scope: Vec<&str> = adapter_ids.iter().map(AsRef::as_ref).collect();
    format!(
        "{}:{}:{}",
        KEY_PREFIX,
        CacheKind::Languages.tag(),
        content_hash(&scope.join(","))
    )
}

/// Facade the router talks to; holds the store and the configured TTL
#[derive(Clone)]
pub struct CacheFacade {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl std::fmt::Debug for CacheFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheFacade").field("ttl", &self.ttl).finish()
    }
}

impl CacheFacade {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Facade over a fresh [`MemoryCache`]
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryCache::new()), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let value = self.store.get(key).await;
        debug!("Cache {} for {}", if value.is_some() { "hit" } else { "miss" }, key);
        value
    }

    /// Store with the facade's default TTL
    pub async fn put(&self, key: &str, value: impl Into<String>) {
        self.put_with_ttl(key, value, self.ttl).await;
    }

    pub async fn put_with_ttl(&self, key: &str, value: impl Into<String>, ttl: Duration) {
        self.store.put(key, value.into(), ttl).await;
    }

    /// Memoize `compute` under `key`; values round-trip through JSON
    pub async fn get_or_compute<T, F, Fut>(&self, key: &str, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(raw) = self.get(key).await {
            match serde_json::from_str(&raw) {
                Ok(value) => return Ok(value),
                Err(e) => debug!("Discarding undecodable cache entry {}: {}", key, e),
            }
        }

        let value = compute().await?;
        self.put(key, serde_json::to_string(&value)?).await;
        Ok(value)
    }

    /// Drop every entry in the underlying store
    pub async fn remove_all(&self) {
        self.store.remove_all().await;
    }
}
