//! Language type: validated language representation.
//!
//! A `Language` always points at a registry entry, so accessors never fail.
//! Resolution from a profile's free-text name is total: unmapped names fall
//! back to English rather than erroring.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};

/// A validated language.
///
/// Cheap to copy; carries only the static code and dereferences the registry
/// for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "fr")
    code: &'static str,
}

impl Language {
    /// English, the fallback for unmapped profile names.
    pub const ENGLISH: Language = Language { code: "en" };

    /// Resolve a profile's free-text language name to a `Language`.
    ///
    /// Total: every input, including unknown names and garbage, yields a
    /// defined language. Names absent from the registry resolve to English.
    ///
    /// # Example
    /// ```ignore
    /// assert_eq!(Language::resolve("French").code(), "fr");
    /// assert_eq!(Language::resolve("Klingon").code(), "en");
    /// ```
    pub fn resolve(name: &str) -> Language {
        let registry = LanguageRegistry::get();
        let config = registry
            .get_by_name(name)
            .unwrap_or_else(|| registry.fallback());
        Language { code: config.code }
    }

    /// Create a Language from a language code string.
    ///
    /// Strict counterpart of [`Language::resolve`] for codes arriving from
    /// persisted data, where an unknown code indicates corruption rather
    /// than a free-text profile entry.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is in the registry
    /// * `Err` if the code is unknown
    pub fn from_code(code: &str) -> Result<Language> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) => Ok(Language { code: config.code }),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is not in the registry. This should never happen
    /// if the Language was constructed properly (via `resolve`, `from_code`
    /// or constants).
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// Get the English name of the language.
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Get the native name of the language.
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }
}
