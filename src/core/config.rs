//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default cache lifetime in days
pub const DEFAULT_CACHE_TTL_DAYS: u64 = 15;

/// Default per-invocation adapter timeout
pub const DEFAULT_ADAPTER_TIMEOUT_MS: u64 = 30_000;

const MILLIS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// Settings for one adapter, keyed by adapter id in [`RouterConfig::adapters`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdapterSettings {
    pub priority: i32,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub enabled: bool,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            priority: 0,
            api_key: None,
            base_url: None,
            enabled: true,
        }
    }
}

impl AdapterSettings {
    pub fn with_priority(priority: i32) -> Self {
        Self {
            priority,
            ..Default::default()
        }
    }

    /// True when an API key or base URL is present and non-empty
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.api_key) || present(&self.base_url)
    }
}

/// Configuration for the router
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub default_target_language: String,
    pub cache_ttl_days: u64,
    pub adapter_timeout_ms: u64,
    pub glossary_path: Option<PathBuf>,
    pub adapters: HashMap<String, AdapterSettings>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_target_language: "en".to_string(),
            cache_ttl_days: DEFAULT_CACHE_TTL_DAYS,
            adapter_timeout_ms: DEFAULT_ADAPTER_TIMEOUT_MS,
            glossary_path: None,
            adapters: HashMap::new(),
        }
    }
}

impl RouterConfig {
    /// Load configuration from `ROUTER_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let default_target_language = std::env::var("ROUTER_DEFAULT_TARGET_LANG")
            .unwrap_or(defaults.default_target_language);

        let cache_ttl_days = std::env::var("ROUTER_CACHE_TTL_DAYS")
            .unwrap_or_else(|_| DEFAULT_CACHE_TTL_DAYS.to_string())
            .parse::<u64>()?;

        let adapter_timeout_ms = std::env::var("ROUTER_ADAPTER_TIMEOUT_MS")
            .unwrap_or_else(|_| DEFAULT_ADAPTER_TIMEOUT_MS.to_string())
            .parse::<u64>()?;

        let glossary_path = std::env::var("ROUTER_GLOSSARY_PATH").ok().map(PathBuf::from);

        Ok(Self {
            default_target_language,
            cache_ttl_days,
            adapter_timeout_ms,
            glossary_path,
            adapters: HashMap::new(),
        })
    }

    /// Load from a YAML, JSON or TOML file, overlaid by `ROUTER__*` variables
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("ROUTER").separator("__"))
            .build()?
            .try_deserialize()?;

        info!(
            "Loaded configuration from {} ({} adapter entries)",
            path.display(),
            config.adapters.len()
        );
        Ok(config)
    }

    /// Load from `ROUTER_CONFIG` when set, otherwise from the environment
    pub fn load() -> anyhow::Result<Self> {
        let config = match std::env::var("ROUTER_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_target_language.trim().is_empty() {
            return Err(anyhow::anyhow!("default_target_language is required"));
        }

        if self.cache_ttl_days == 0 {
            return Err(anyhow::anyhow!("cache_ttl_days must be greater than 0"));
        }

        if self.adapter_timeout_ms == 0 {
            return Err(anyhow::anyhow!("adapter_timeout_ms must be greater than 0"));
        }

        if self.adapters.values().all(|a| !a.enabled) && !self.adapters.is_empty() {
            warn!("All configured adapters are disabled");
        }

        Ok(())
    }

    /// Cache lifetime as a duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_days.saturating_mul(MILLIS_PER_DAY))
    }

    /// Per-invocation adapter timeout
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_millis(self.adapter_timeout_ms)
    }

    /// Settings for an adapter, falling back to defaults when not configured
    pub fn adapter_settings(&self, id: &str) -> AdapterSettings {
        self.adapters.get(id).cloned().unwrap_or_default()
    }
}
