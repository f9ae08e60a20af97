//! Built-in adapters

pub mod glossary;
pub mod passthrough;

use std::sync::Arc;
use tracing::info;

use crate::core::config::{AdapterSettings, RouterConfig};
use crate::core::registry::AdapterRegistry;

use glossary::GlossaryAdapter;
use passthrough::{PassthroughAdapter, PASSTHROUGH_ID};

/// Priority given to the passthrough adapter when not configured
pub const PASSTHROUGH_PRIORITY: i32 = 100;

/// Registry holding the glossary when `glossary_path` is set.
///
/// The passthrough adapter is added when it is listed under `adapters`, or
/// on its own when no glossary is configured. It never sits silently behind
/// the glossary, where it would turn every glossary miss into a cached echo.
pub fn builtin_registry(config: &RouterConfig) -> anyhow::Result<AdapterRegistry> {
    let mut registry = AdapterRegistry::new(config.adapter_timeout());

    if let Some(path) = &config.glossary_path {
        let glossary = GlossaryAdapter::from_file(path)?;
        registry.register_configured(Arc::new(glossary), config);
    }

    let passthrough = Arc::new(PassthroughAdapter::new());
    if config.adapters.contains_key(PASSTHROUGH_ID) {
        registry.register_configured(passthrough, config);
    } else if config.glossary_path.is_none() {
        registry.register(passthrough, AdapterSettings::with_priority(PASSTHROUGH_PRIORITY));
    }

    info!("Registered {} built-in adapters", registry.universe().len());
    Ok(registry)
}
