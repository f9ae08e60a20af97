//! Translation Router - adapter fallback and lookaside caching for translation
//!
//! This library routes translation and language-detection requests across
//! pluggable backends, caches results, and falls back to the next adapter
//! when one fails.

#![forbid(unsafe_code)]

pub mod adapters;
pub mod cli;
pub mod core;

// Re-export key types for convenience
pub use crate::core::{
    adapter::{Adapter, AdapterHandle, Capabilities},
    cache::{CacheFacade, CacheStore, MemoryCache},
    config::{AdapterSettings, RouterConfig},
    errors::{AdapterError, RouterError},
    language::{normalize, LanguageCode},
    models::{
        AdapterDescriptor, Detection, SupportedLanguageEntry, TranslateOptions, TranslationRequest,
    },
    registry::AdapterRegistry,
    router::{TranslationRouter, MAX_ATTEMPTS},
};

pub use crate::adapters::{glossary::GlossaryAdapter, passthrough::PassthroughAdapter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
