//! Adapter registration, availability filtering and ordering

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::adapter::{guarded, Adapter, AdapterHandle};
use crate::core::config::{AdapterSettings, RouterConfig, DEFAULT_ADAPTER_TIMEOUT_MS};
use crate::core::errors::AdapterError;
use crate::core::language::LanguageCode;
use crate::core::models::AdapterDescriptor;

/// Registered adapters plus an optional caller-scoped replacement list
#[derive(Debug, Clone)]
pub struct AdapterRegistry {
    adapters: Arc<Vec<AdapterHandle>>,
    override_list: Option<Arc<Vec<AdapterHandle>>>,
    timeout: Duration,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_ADAPTER_TIMEOUT_MS))
    }
}

impl AdapterRegistry {
    /// Empty registry; `timeout` bounds every availability and pair check
    pub fn new(timeout: Duration) -> Self {
        Self {
            adapters: Arc::new(Vec::new()),
            override_list: None,
            timeout,
        }
    }

    /// Same registry with every guarded call bounded by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Register an adapter with explicit settings
    pub fn register(&mut self, adapter: Arc<dyn Adapter>, settings: AdapterSettings) {
        self.register_handle(AdapterHandle::new(adapter, settings));
    }

    pub fn register_handle(&mut self, handle: AdapterHandle) {
        debug!("Registered adapter {} (priority {})", handle.id(), handle.priority());
        Arc::make_mut(&mut self.adapters).push(handle);
    }

    /// Register using the adapter's settings from `config`; disabled adapters are skipped
    pub fn register_configured(
        &mut self,
        adapter: Arc<dyn Adapter>,
        config: &RouterConfig,
    ) -> bool {
        let settings = config.adapter_settings(adapter.id());
        if !settings.enabled {
            info!("Adapter {} disabled by configuration", adapter.id());
            return false;
        }
        self.register(adapter, settings);
        true
    }

    /// Copy of this registry whose universe is replaced by `handles`.
    ///
    /// The replacement keeps the caller's order and is still filtered by
    /// availability.
    pub fn with_override(&self, handles: Vec<AdapterHandle>) -> Self {
        Self {
            adapters: Arc::clone(&self.adapters),
            override_list: Some(Arc::new(handles)),
            timeout: self.timeout,
        }
    }

    /// Candidate universe before availability filtering
    pub fn universe(&self) -> Vec<AdapterHandle> {
        match &self.override_list {
            Some(list) => list.as_ref().clone(),
            None => {
                let mut handles = self.adapters.as_ref().clone();
                // stable: ties keep registration order
                handles.sort_by_key(AdapterHandle::priority);
                handles
            }
        }
    }

    /// Look up an adapter by id, ignoring availability and priority
    pub fn find(&self, id: &str) -> Option<AdapterHandle> {
        self.universe().into_iter().find(|h| h.id() == id)
    }

    /// Available adapters in dispatch order
    pub async fn list_adapters(&self) -> Vec<AdapterHandle> {
        let mut available = Vec::new();
        for handle in self.universe() {
            if self.is_available(&handle).await {
                available.push(handle);
            }
        }
        available
    }

    /// Available adapters that declare support for `source -> target`.
    ///
    /// With no known source, or when no adapter claims the pair, the full
    /// ordered list is returned.
    pub async fn adapters_for_pair(
        &self,
        source: Option<&LanguageCode>,
        target: &LanguageCode,
    ) -> Vec<AdapterHandle> {
        let adapters = self.list_adapters().await;
        let Some(source) = source else {
            return adapters;
        };

        let mut supporting = Vec::new();
        for handle in &adapters {
            if self.supports_pair(handle, source, target).await {
                supporting.push(handle.clone());
            }
        }

        if supporting.is_empty() {
            debug!(
                "No adapter declares {} -> {}, trying all {} adapters",
                source,
                target,
                adapters.len()
            );
            adapters
        } else {
            supporting
        }
    }

    /// Guarded pair check; adapters without the capability support nothing
    pub async fn supports_pair(
        &self,
        handle: &AdapterHandle,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> bool {
        if !handle.capabilities().pair_check {
            return false;
        }

        let check = async {
            let supported = handle.adapter().supports_pair(source, target).await;
            Ok::<_, AdapterError>(supported)
        };
        match guarded(handle.id(), self.timeout, check).await {
            Ok(supported) => supported,
            Err(e) => {
                warn!("Pair check on {} failed: {}", handle.id(), e);
                false
            }
        }
    }

    /// Snapshot of every adapter in the universe with its current availability
    pub async fn descriptors(&self) -> Vec<AdapterDescriptor> {
        let mut descriptors = Vec::new();
        for handle in self.universe() {
            descriptors.push(AdapterDescriptor {
                adapter_id: handle.id().to_string(),
                priority: handle.priority(),
                available: self.is_available(&handle).await,
            });
        }
        descriptors
    }

    /// True when any adapter has an API key or base URL configured
    pub fn any_configured(&self) -> bool {
        self.universe().iter().any(|h| h.settings().is_configured())
    }

    async fn is_available(&self, handle: &AdapterHandle) -> bool {
        match guarded(handle.id(), self.timeout, handle.adapter().is_available()).await {
            Ok(available) => available,
            Err(e) => {
                warn!("Availability check on {} failed, skipping: {}", handle.id(), e);
                false
            }
        }
    }
}
