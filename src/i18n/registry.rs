//! Language registry: single source of truth for all supported languages.
//!
//! Profiles store language *names* ("English", "French"), never codes; this
//! registry maps those names to the short codes the translation engine
//! understands. It uses a singleton pattern with `OnceLock` to ensure
//! thread-safe initialization and access.

use std::sync::OnceLock;

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "es", "fr")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Spanish", "French")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "Español", "Français")
    pub native_name: &'static str,
}

/// Global language registry singleton.
///
/// Contains the fixed table of languages a profile may select and provides
/// lookup by name or code. Initialized once on first access and immutable
/// thereafter.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: supported_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Arguments
    /// * `code` - The ISO 639-1 language code (e.g., "en", "fr")
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get a language configuration by its English name.
    ///
    /// Profile language fields are free text, so the match is trimmed and
    /// case-insensitive. Returns `None` for names absent from the table;
    /// callers that need totality go through [`LanguageRegistry::fallback`].
    pub fn get_by_name(&self, name: &str) -> Option<&LanguageConfig> {
        let name = name.trim();
        self.languages
            .iter()
            .find(|lang| lang.name.eq_ignore_ascii_case(name))
    }

    /// The fallback language used when a profile carries an unmapped name.
    ///
    /// # Panics
    /// Panics if English is missing from the table (a configuration error).
    pub fn fallback(&self) -> &LanguageConfig {
        self.get_by_code("en")
            .expect("fallback language missing from registry")
    }

    /// Get all supported languages.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Check if a language name is present in the table.
    pub fn is_supported(&self, name: &str) -> bool {
        self.get_by_name(name).is_some()
    }
}

/// The fixed language table.
///
/// Covers the twenty languages selectable in the profile editor. Anything
/// else resolves to English.
fn supported_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
        },
        LanguageConfig {
            code: "es",
            name: "Spanish",
            native_name: "Español",
        },
        LanguageConfig {
            code: "fr",
            name: "French",
            native_name: "Français",
        },
        LanguageConfig {
            code: "de",
            name: "German",
            native_name: "Deutsch",
        },
        LanguageConfig {
            code: "it",
            name: "Italian",
            native_name: "Italiano",
        },
        LanguageConfig {
            code: "pt",
            name: "Portuguese",
            native_name: "Português",
        },
        LanguageConfig {
            code: "zh",
            name: "Chinese",
            native_name: "中文",
        },
        LanguageConfig {
            code: "ja",
            name: "Japanese",
            native_name: "日本語",
        },
        LanguageConfig {
            code: "ko",
            name: "Korean",
            native_name: "한국어",
        },
        LanguageConfig {
            code: "ar",
            name: "Arabic",
            native_name: "العربية",
        },
        LanguageConfig {
            code: "ru",
            name: "Russian",
            native_name: "Русский",
        },
        LanguageConfig {
            code: "hi",
            name: "Hindi",
            native_name: "हिन्दी",
        },
        LanguageConfig {
            code: "nl",
            name: "Dutch",
            native_name: "Nederlands",
        },
        LanguageConfig {
            code: "pl",
            name: "Polish",
            native_name: "Polski",
        },
        LanguageConfig {
            code: "tr",
            name: "Turkish",
            native_name: "Türkçe",
        },
        LanguageConfig {
            code: "vi",
            name: "Vietnamese",
            native_name: "Tiếng Việt",
        },
        LanguageConfig {
            code: "th",
            name: "Thai",
            native_name: "ไทย",
        },
        LanguageConfig {
            code: "el",
            name: "Greek",
            native_name: "Ελληνικά",
        },
        LanguageConfig {
            code: "he",
            name: "Hebrew",
            native_name: "עברית",
        },
        LanguageConfig {
            code: "sv",
            name: "Swedish",
            native_name: "Svenska",
        },
    ]
}
