//! Core types used throughout the project.

use std::collections::HashMap;
use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// Key → text mapping for a single language.
pub type LanguageCatalog = HashMap<String, String>;

/// Catalogs for every language, keyed by language code.
pub type TranslationSet = HashMap<LanguageCode, LanguageCatalog>;

/// Rejected language code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid language code '{code}': {reason}")]
pub struct InvalidLanguageCode {
    pub code: String,
    pub reason: &'static str,
}

/// Short language identifier such as `en` or `pt-BR`.
///
/// Used as a directory segment, so it never contains path separators and is
/// never `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// # Errors
    /// Returns [`InvalidLanguageCode`] when the code cannot be used as a directory segment.
    pub fn new(code: impl Into<String>) -> Result<Self, InvalidLanguageCode> {
        let code = code.into();
        let reason = if code.is_empty() {
            Some("must not be empty")
        } else if code == "." || code == ".." {
            Some("must not be a relative path component")
        } else if code.contains(['/', '\\', '\0']) {
            Some("must not contain path separators")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InvalidLanguageCode { code, reason }),
            None => Ok(Self(code)),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = InvalidLanguageCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for LanguageCode {
    type Error = InvalidLanguageCode;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

/// Overlays `update` onto `existing`.
///
/// `merge(existing, update)[lang][key]` is `update[lang][key]` when present,
/// otherwise `existing[lang][key]`. Languages only in `existing` are untouched.
#[must_use]
pub fn merge(mut existing: TranslationSet, update: &TranslationSet) -> TranslationSet {
    for (language, entries) in update {
        let catalog = existing.entry(language.clone()).or_default();
        catalog.extend(entries.iter().map(|(key, text)| (key.clone(), text.clone())));
    }
    existing
}
