//! Multi-language string values.
//!
//! Statistical metadata is maintained in Norwegian Bokmål, Nynorsk and
//! English. A value is stored per language only when it has actually been
//! supplied; absence of a language entry means "not set for that language",
//! never an empty string forced into place.

use serde::{Deserialize, Serialize};

/// Language codes supported for metadata values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    /// Norwegian Bokmål
    Nb,
    /// Norwegian Nynorsk
    Nn,
    /// English
    En,
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageCode::Nb => write!(f, "nb"),
            LanguageCode::Nn => write!(f, "nn"),
            LanguageCode::En => write!(f, "en"),
        }
    }
}

/// A single (language, text) entry within a multi-language string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageStringTypeItem {
    /// The language this text is written in
    #[serde(rename = "languageCode")]
    pub language_code: LanguageCode,

    /// The text in that language
    #[serde(rename = "languageText")]
    pub language_text: String,
}

/// An ordered set of (language, text) pairs with at most one entry per
/// language.
///
/// Serialized as a list of `{languageCode, languageText}` records. Earlier
/// document versions stored these values as a mapping of code to text; the
/// backwards-compatibility upgrader converts that shape on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageStringType(pub Vec<LanguageStringTypeItem>);

impl LanguageStringType {
    /// Create an empty multi-language string
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create a multi-language string with a single entry
    pub fn from_single(language_code: LanguageCode, text: impl Into<String>) -> Self {
        Self(vec![LanguageStringTypeItem {
            language_code,
            language_text: text.into(),
        }])
    }

    /// Get the text for the given language, if set
    pub fn get(&self, language_code: LanguageCode) -> Option<&str> {
        self.0
            .iter()
            .find(|item| item.language_code == language_code)
            .map(|item| item.language_text.as_str())
    }

    /// Set the text for the given language, replacing any existing entry
    pub fn set(&mut self, language_code: LanguageCode, text: impl Into<String>) {
        let text = text.into();
        if let Some(item) = self
            .0
            .iter_mut()
            .find(|item| item.language_code == language_code)
        {
            item.language_text = text;
        } else {
            self.0.push(LanguageStringTypeItem {
                language_code,
                language_text: text,
            });
        }
    }

    /// True if at least one language entry carries non-empty text.
    ///
    /// Used for completeness scoring: an all-empty value does not count as
    /// a set field.
    pub fn has_content(&self) -> bool {
        self.0.iter().any(|item| !item.language_text.is_empty())
    }

    /// The first non-empty text in entry order, if any
    pub fn first_text(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|item| !item.language_text.is_empty())
            .map(|item| item.language_text.as_str())
    }
}
