//! Language code normalization

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercase two-character language code
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Normalize any string-like or `Display` value into a code.
    ///
    /// Lowercases, then keeps the first two characters. No ISO validation is
    /// done, so `"eng"` becomes `"en"` and `"xyz"` becomes `"xy"`.
    pub fn new(code: impl ToString) -> Self {
        let code = code.to_string().to_lowercase();
        LanguageCode(code.chars().take(2).collect())
    }

    /// Borrow the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LanguageCode {
    fn from(code: String) -> Self {
        LanguageCode::new(code)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize an optional code; `None` and empty input mean auto-detect.
pub fn normalize<T: ToString>(code: Option<T>) -> Option<LanguageCode> {
    let code = code?.to_string();
    if code.is_empty() {
        return None;
    }
    Some(LanguageCode::new(code))
}
