//! Mention records produced by extraction backends.

use serde::{Deserialize, Serialize};

/// One observed occurrence of a candidate location string.
///
/// Offsets are byte indices into the whole document, not the chunk the
/// mention was extracted from. Mentions are immutable after creation and
/// owned by exactly one candidate group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Surface text exactly as it appeared
    pub text: String,

    /// Sentence containing the mention
    pub sentence: String,

    /// Document-global start offset
    pub start_char: usize,

    /// Document-global end offset
    pub end_char: usize,

    /// Index of the window the mention was extracted from
    pub chunk_index: usize,

    /// Origin label (extractor entity type, or a fixed marker like "llm")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Mention {
    /// Create a mention, clamping a start offset past the end offset.
    pub fn new(
        text: impl Into<String>,
        sentence: impl Into<String>,
        start_char: usize,
        end_char: usize,
        chunk_index: usize,
        label: Option<String>,
    ) -> Self {
        Self {
            text: text.into(),
            sentence: sentence.into(),
            start_char: start_char.min(end_char),
            end_char,
            chunk_index,
            label,
        }
    }

    /// Grouping key for aggregation: the lower-cased surface text.
    pub fn key(&self) -> String {
        self.text.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_ordered() {
        let m = Mention::new("Lima", "We reached Lima.", 20, 11, 0, None);
        assert!(m.start_char <= m.end_char);
    }

    #[test]
    fn test_key_is_lowercased() {
        let m = Mention::new("La Paz", "La Paz at dawn.", 0, 6, 0, Some("llm".into()));
        assert_eq!(m.key(), "la paz");
    }
}
