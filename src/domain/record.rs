// ============================================================
// Layer 3 — Article Record Domain Type
// ============================================================
// One training example as it appears in the jsonl dataset:
// the sentences of a document plus the indices of the
// sentences a human editor chose for the summary.

use serde::{Deserialize, Serialize};

/// One document with its extractive-summary labels.
/// By the time an ArticleRecord exists, the jsonl line has
/// already been parsed — this type knows nothing about files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArticleRecord {
    /// The document split into sentences, in reading order
    pub sentences: Vec<String>,

    /// Indices into `sentences` that belong to the summary.
    /// Missing in some corpora, hence the serde default.
    #[serde(default)]
    pub extractive: Vec<usize>,
}

impl ArticleRecord {
    /// Create a new record. Uses impl Into<...> so callers can
    /// pass vectors of &str or String alike in tests.
    pub fn new(sentences: Vec<String>, extractive: Vec<usize>) -> Self {
        Self { sentences, extractive }
    }

    /// Whether the sentence at `index` is part of the reference summary
    pub fn is_extractive(&self, index: usize) -> bool {
        self.extractive.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extractive_lookup() {
        let r = ArticleRecord::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![0, 2],
        );
        assert!(r.is_extractive(0));
        assert!(!r.is_extractive(1));
        assert!(r.is_extractive(2));
        assert!(!r.is_extractive(3));
    }

    #[test]
    fn extractive_field_defaults_to_empty() {
        let r: ArticleRecord =
            serde_json::from_str(r#"{"sentences": ["only one"]}"#).unwrap();
        assert_eq!(r.sentences.len(), 1);
        assert!(r.extractive.is_empty());
    }
}
