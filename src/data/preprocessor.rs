// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Normalises raw sentence text before tokenisation:
//   - strips control characters left over from scraping
//   - collapses runs of whitespace into single spaces
//   - trims leading/trailing whitespace
//
// Sentence boundaries are preserved: cleaning never drops or
// merges sentences, so the extraction labels stay aligned
// with their sentence indices.

/// Cleans raw text extracted from articles.
pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Clean one sentence. Returns an empty string if nothing
    /// printable remains — the sample builder skips those.
    pub fn clean(&self, text: &str) -> String {
        let printable: String = text.chars().filter(|c| !c.is_control()).collect();
        printable.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  hello   world \t again "), "hello world again");
    }

    #[test]
    fn strips_control_characters() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("a\u{0000}b\u{0007}c"), "abc");
    }

    #[test]
    fn empty_input_stays_empty() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(" \n \t "), "");
    }
}
