//! Adapter that returns its input unchanged

use async_trait::async_trait;

use crate::core::adapter::{Adapter, Capabilities};
use crate::core::errors::AdapterResult;
use crate::core::language::LanguageCode;
use crate::core::models::TranslateOptions;

/// Identifier used for settings lookup
pub const PASSTHROUGH_ID: &str = "passthrough";

/// Echoes the source text; useful as a last-resort fallback
#[derive(Debug, Clone, Default)]
pub struct PassthroughAdapter;

impl PassthroughAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Adapter for PassthroughAdapter {
    fn id(&self) -> &str {
        PASSTHROUGH_ID
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            batch: true,
            ..Default::default()
        }
    }

    async fn translate(
        &self,
        text: &str,
        _source: Option<&LanguageCode>,
        _target: &LanguageCode,
        _options: &TranslateOptions,
    ) -> AdapterResult<String> {
        Ok(text.to_string())
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        _source: Option<&LanguageCode>,
        _target: &LanguageCode,
        _options: &TranslateOptions,
    ) -> AdapterResult<Vec<String>> {
        Ok(texts.to_vec())
    }
}
