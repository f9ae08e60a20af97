//! Adapter contract and guarded invocation
//!
//! An [`Adapter`] wraps one translation backend. Optional operations have
//! default bodies returning [`AdapterError::Unsupported`]; the router never
//! checks for them at call time but reads the [`Capabilities`] captured when
//! the adapter was registered.

use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use crate::core::config::AdapterSettings;
use crate::core::errors::{AdapterError, AdapterResult};
use crate::core::language::LanguageCode;
use crate::core::models::{Detection, SupportedLanguageEntry, TranslateOptions};

/// Optional operations an adapter implements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub batch: bool,
    pub detect: bool,
    pub languages: bool,
    pub pair_check: bool,
}

impl Capabilities {
    /// Every optional operation
    pub fn all() -> Self {
        Self {
            batch: true,
            detect: true,
            languages: true,
            pair_check: true,
        }
    }
}

/// A pluggable translation backend
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Stable identifier, also the key into adapter settings
    fn id(&self) -> &str;

    /// Optional operations this adapter implements
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Translate one text; `source` is `None` for auto-detect
    async fn translate(
        &self,
        text: &str,
        source: Option<&LanguageCode>,
        target: &LanguageCode,
        options: &TranslateOptions,
    ) -> AdapterResult<String>;

    async fn translate_batch(
        &self,
        _texts: &[String],
        _source: Option<&LanguageCode>,
        _target: &LanguageCode,
        _options: &TranslateOptions,
    ) -> AdapterResult<Vec<String>> {
        Err(AdapterError::Unsupported {
            operation: "translate_batch",
        })
    }

    async fn detect_language(&self, _text: &str) -> AdapterResult<Detection> {
        Err(AdapterError::Unsupported {
            operation: "detect_language",
        })
    }

    async fn supported_languages(&self) -> AdapterResult<Vec<SupportedLanguageEntry>> {
        Err(AdapterError::Unsupported {
            operation: "supported_languages",
        })
    }

    async fn supports_pair(&self, _source: &LanguageCode, _target: &LanguageCode) -> bool {
        false
    }

    /// May perform a health check; defaults to available
    async fn is_available(&self) -> AdapterResult<bool> {
        Ok(true)
    }
}

/// A registered adapter together with its settings and captured capabilities
#[derive(Clone)]
pub struct AdapterHandle {
    adapter: Arc<dyn Adapter>,
    capabilities: Capabilities,
    settings: AdapterSettings,
}

impl std::fmt::Debug for AdapterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterHandle")
            .field("id", &self.id())
            .field("capabilities", &self.capabilities)
            .field("priority", &self.settings.priority)
            .finish()
    }
}

impl AdapterHandle {
    pub fn new(adapter: Arc<dyn Adapter>, settings: AdapterSettings) -> Self {
        let capabilities = adapter.capabilities();
        Self {
            adapter,
            capabilities,
            settings,
        }
    }

    /// Handle with default settings
    pub fn from_adapter(adapter: impl Adapter + 'static) -> Self {
        Self::new(Arc::new(adapter), AdapterSettings::default())
    }

    pub fn id(&self) -> &str {
        self.adapter.id()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    pub fn priority(&self) -> i32 {
        self.settings.priority
    }

    pub fn adapter(&self) -> &dyn Adapter {
        self.adapter.as_ref()
    }
}

/// Run one adapter call so that panics and timeouts come back as errors
pub async fn guarded<T, Fut>(adapter_id: &str, timeout: Duration, call: Fut) -> AdapterResult<T>
where
    Fut: Future<Output = AdapterResult<T>>,
{
    let call = AssertUnwindSafe(call).catch_unwind();

    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(result)) => result,
        Ok(Err(payload)) => {
            let message = panic_message(payload.as_ref());
            error!("Adapter {} panicked: {}", adapter_id, message);
            Err(AdapterError::Panicked { message })
        }
        Err(_) => Err(AdapterError::Timeout {
            after_ms: timeout.as_millis() as u64,
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
