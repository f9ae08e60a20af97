//! Core data models for routing

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::core::language::LanguageCode;

/// Per-call options forwarded to adapters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslateOptions {
    /// Force a single adapter by id, bypassing priority and pair filtering
    pub adapter: Option<String>,
    /// Provider-specific extras passed through untouched
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl TranslateOptions {
    pub fn with_adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: Option<String>,
    pub target_lang: String,
    #[serde(default)]
    pub options: TranslateOptions,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_lang: None,
            target_lang: target_lang.into(),
            options: TranslateOptions::default(),
        }
    }

    pub fn with_source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = Some(source_lang.into());
        self
    }

    pub fn with_options(mut self, options: TranslateOptions) -> Self {
        self.options = options;
        self
    }
}

/// Language detection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub language: LanguageCode,
    pub confidence: f64,
}

impl Detection {
    pub fn new(language: impl ToString, confidence: f64) -> Self {
        Self {
            language: LanguageCode::new(language),
            confidence,
        }
    }
}

/// One language an adapter can translate from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedLanguageEntry {
    pub code: String,
    pub name: String,
    pub targets: BTreeSet<String>,
}

impl SupportedLanguageEntry {
    pub fn new<I, S>(code: impl Into<String>, name: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            code: code.into(),
            name: name.into(),
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }
}

/// Snapshot of a registered adapter, recomputed on every query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterDescriptor {
    pub adapter_id: String,
    pub priority: i32,
    pub available: bool,
}
