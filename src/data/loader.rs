// ============================================================
// Layer 4 — Jsonl Loader
// ============================================================
// Reads the training file: one JSON object per line, each an
// ArticleRecord. Blank lines are skipped; a malformed line is
// a hard error (silently dropping labelled data would skew
// the dataset), reported with its line number.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::record::ArticleRecord;
use crate::domain::traits::RecordSource;

/// Loads ArticleRecords from a line-delimited JSON file.
pub struct JsonlLoader {
    path: PathBuf,
}

impl JsonlLoader {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: PathBuf::from(path.into()) }
    }
}

impl RecordSource for JsonlLoader {
    fn load_all(&self) -> Result<Vec<ArticleRecord>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read dataset '{}'", self.path.display()))?;

        let mut records = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            records.push(parse_record(line).with_context(|| {
                format!("Malformed record at {}:{}", self.path.display(), line_no + 1)
            })?);
        }

        tracing::debug!("Parsed {} records from '{}'", records.len(), self.path.display());
        Ok(records)
    }
}

/// Parse a single jsonl line into an ArticleRecord.
pub(crate) fn parse_record(line: &str) -> Result<ArticleRecord> {
    Ok(serde_json::from_str(line)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_record() {
        let r = parse_record(
            r#"{"sentences": ["First.", "Second.", "Third."], "extractive": [1]}"#,
        )
        .unwrap();
        assert_eq!(r.sentences.len(), 3);
        assert_eq!(r.extractive, vec![1]);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_record("{not json").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let loader = JsonlLoader::new("definitely/not/here.jsonl");
        assert!(loader.load_all().is_err());
    }
}
