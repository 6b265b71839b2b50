use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TextError {
    #[error("text must not be empty")]
    Empty,
}

/// A line shown in the target language with its gloss.
///
/// `translation` may be empty for lines that need no gloss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawText", into = "RawText")]
pub struct BilingualText {
    primary: String,
    translation: String,
}

impl BilingualText {
    /// # Errors
    ///
    /// Returns `TextError::Empty` when `primary` is blank.
    pub fn new(
        primary: impl Into<String>,
        translation: impl Into<String>,
    ) -> Result<Self, TextError> {
        let primary = primary.into();
        if primary.trim().is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self {
            primary,
            translation: translation.into(),
        })
    }

    #[must_use]
    pub fn primary(&self) -> &str {
        &self.primary
    }

    #[must_use]
    pub fn translation(&self) -> &str {
        &self.translation
    }

    #[must_use]
    pub fn has_translation(&self) -> bool {
        !self.translation.trim().is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct RawText {
    primary: String,
    #[serde(default)]
    translation: String,
}

impl TryFrom<RawText> for BilingualText {
    type Error = TextError;

    fn try_from(raw: RawText) -> Result<Self, Self::Error> {
        Self::new(raw.primary, raw.translation)
    }
}

impl From<BilingualText> for RawText {
    fn from(text: BilingualText) -> Self {
        Self {
            primary: text.primary,
            translation: text.translation,
        }
    }
}
