//! Language resolution for book text.
//!
//! Extraction and geocoding are language-sensitive, so every run carries one
//! supported language code. A caller-provided code is validated; otherwise
//! the language is detected from the text.

use thiserror::Error;
use tracing::debug;
use whatlang::Lang;

/// Language codes the pipeline supports.
pub const SUPPORTED_LANGS: &[&str] = &["en", "es"];

#[derive(Debug, Clone, Error)]
pub enum LanguageError {
    #[error("Language '{lang}' is not supported. Use one of: en, es.")]
    Unsupported { lang: String },

    #[error("Could not detect a supported language from the text. Pass one explicitly.")]
    DetectionFailed,
}

/// Detect the text's language and map it to a supported code.
pub fn detect_language(text: &str) -> Result<String, LanguageError> {
    let info = whatlang::detect(text).ok_or(LanguageError::DetectionFailed)?;
    debug!(lang = %info.lang(), confidence = info.confidence(), "language detected");

    match info.lang() {
        Lang::Eng => Ok("en".to_string()),
        Lang::Spa => Ok("es".to_string()),
        other => Err(LanguageError::Unsupported {
            lang: other.code().to_string(),
        }),
    }
}

/// Return a valid language code from an explicit override or detection.
pub fn resolve_language(text: &str, provided: Option<&str>) -> Result<String, LanguageError> {
    match provided {
        Some(lang) => {
            if SUPPORTED_LANGS.contains(&lang) {
                Ok(lang.to_string())
            } else {
                Err(LanguageError::Unsupported { lang: lang.to_string() })
            }
        }
        None => detect_language(text),
    }
}
