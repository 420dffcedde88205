//! Internationalization (i18n) module: language resolution.
//!
//! Profiles carry free-text language names; the translation engine wants
//! short codes. This module owns that mapping.
//!
//! - `registry`: single source of truth for all supported languages
//! - `language`: validated `Language` type with total name resolution
//!
//! # Example
//!
//! ```rust,ignore
//! use tandem_chat::i18n::Language;
//!
//! let native = Language::resolve("English");
//! let target = Language::resolve("French");
//! assert_eq!(target.code(), "fr");
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
