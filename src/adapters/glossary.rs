//! Offline phrase-table adapter loaded from YAML
//!
//! File layout:
//!
//! ```yaml
//! languages:
//!   en: English
//!   es: Spanish
//! phrases:
//!   en:
//!     es:
//!       hello: hola
//!       world: mundo
//! ```
//!
//! Lookups are exact phrase matches, case-insensitive on the source side.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::core::adapter::{Adapter, Capabilities};
use crate::core::errors::{AdapterError, AdapterResult};
use crate::core::language::LanguageCode;
use crate::core::models::{Detection, SupportedLanguageEntry, TranslateOptions};

/// Identifier used for settings lookup
pub const GLOSSARY_ID: &str = "glossary";

/// Confidence reported when a phrase belongs to exactly one source language
const SINGLE_MATCH_CONFIDENCE: f64 = 0.9;

type PhraseTable = BTreeMap<String, String>;

#[derive(Debug, Default, Deserialize)]
struct GlossaryFile {
    #[serde(default)]
    languages: BTreeMap<String, String>,
    #[serde(default)]
    phrases: BTreeMap<String, BTreeMap<String, PhraseTable>>,
}

/// Phrase-table adapter
#[derive(Debug, Clone, Default)]
pub struct GlossaryAdapter {
    names: BTreeMap<LanguageCode, String>,
    // source -> target -> lowercased phrase -> translation
    phrases: BTreeMap<LanguageCode, BTreeMap<LanguageCode, PhraseTable>>,
}

impl GlossaryAdapter {
    /// Parse a glossary from YAML text
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let file: GlossaryFile = serde_yaml::from_str(content)?;

        let names = file
            .languages
            .into_iter()
            .map(|(code, name)| (LanguageCode::new(code), name))
            .collect();

        let mut phrases: BTreeMap<LanguageCode, BTreeMap<LanguageCode, PhraseTable>> =
            BTreeMap::new();
        for (source, targets) in file.phrases {
            let by_target = phrases.entry(LanguageCode::new(source)).or_default();
            for (target, entries) in targets {
                let table = by_target.entry(LanguageCode::new(target)).or_default();
                for (phrase, translation) in entries {
                    table.insert(phrase.trim().to_lowercase(), translation);
                }
            }
        }

        Ok(Self { names, phrases })
    }

    /// Load a glossary file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let glossary = Self::from_yaml_str(&content)?;
        info!(
            "Loaded glossary from {} ({} phrases)",
            path.display(),
            glossary.phrase_count()
        );
        Ok(glossary)
    }

    /// Total number of phrase entries
    pub fn phrase_count(&self) -> usize {
        self.phrases
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeMap::len)
            .sum()
    }

    fn lookup(
        &self,
        text: &str,
        source: Option<&LanguageCode>,
        target: &LanguageCode,
    ) -> AdapterResult<String> {
        let phrase = text.trim().to_lowercase();

        let found = match source {
            Some(source) => self
                .phrases
                .get(source)
                .and_then(|targets| targets.get(target))
                .and_then(|table| table.get(&phrase)),
            None => self
                .phrases
                .values()
                .filter_map(|targets| targets.get(target))
                .find_map(|table| table.get(&phrase)),
        };

        found.cloned().ok_or_else(|| {
            AdapterError::failed(format!(
                "no glossary entry for '{}' ({} -> {})",
                text,
                source.map(LanguageCode::as_str).unwrap_or("auto"),
                target
            ))
        })
    }
}

#[async_trait]
impl Adapter for GlossaryAdapter {
    fn id(&self) -> &str {
        GLOSSARY_ID
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    async fn translate(
        &self,
        text: &str,
        source: Option<&LanguageCode>,
        target: &LanguageCode,
        _options: &TranslateOptions,
    ) -> AdapterResult<String> {
        self.lookup(text, source, target)
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source: Option<&LanguageCode>,
        target: &LanguageCode,
        _options: &TranslateOptions,
    ) -> AdapterResult<Vec<String>> {
        texts.iter().map(|text| self.lookup(text, source, target)).collect()
    }

    async fn detect_language(&self, text: &str) -> AdapterResult<Detection> {
        let phrase = text.trim().to_lowercase();
        let matches: Vec<&LanguageCode> = self
            .phrases
            .iter()
            .filter(|(_, targets)| targets.values().any(|table| table.contains_key(&phrase)))
            .map(|(source, _)| source)
            .collect();

        match matches.first() {
            Some(language) => Ok(Detection {
                language: (*language).clone(),
                confidence: SINGLE_MATCH_CONFIDENCE / matches.len() as f64,
            }),
            None => Err(AdapterError::failed(format!("cannot detect language of '{}'", text))),
        }
    }

    async fn supported_languages(&self) -> AdapterResult<Vec<SupportedLanguageEntry>> {
        Ok(self
            .phrases
            .iter()
            .map(|(code, targets)| SupportedLanguageEntry {
                code: code.to_string(),
                name: self
                    .names
                    .get(code)
                    .cloned()
                    .unwrap_or_else(|| code.to_string()),
                targets: targets.keys().map(LanguageCode::to_string).collect(),
            })
            .collect())
    }

    async fn supports_pair(&self, source: &LanguageCode, target: &LanguageCode) -> bool {
        self.phrases
            .get(source)
            .is_some_and(|targets| targets.contains_key(target))
    }

    async fn is_available(&self) -> AdapterResult<bool> {
        Ok(self.phrase_count() > 0)
    }
}
