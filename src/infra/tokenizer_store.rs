// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Manages tokenizer building, saving, and loading.
//
// The vocabulary is built once from the article corpus and
// persisted as tokenizer.json next to the snapshots, so a
// resumed run tokenises identically to the run that wrote the
// snapshot. In tokenizers 0.15 the trainer API fights the
// ModelWrapper types, so the word-level tokenizer JSON is
// written directly and loaded back through Tokenizer::from_file.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

// First id handed to a corpus word. The BERT-convention special
// tokens sit below this, with a gap left at 2..=100.
const FIRST_WORD_ID: usize = 104;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Load existing tokenizer or build a new one from the corpus
    pub fn load_or_build(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        let tok_path = self.dir.join("tokenizer.json");
        if tok_path.exists() {
            tracing::info!("Loading existing tokenizer from disk");
            self.load()
        } else {
            tracing::info!("Building new tokenizer (vocab_size={})", vocab_size);
            self.build_and_save(texts, vocab_size)
        }
    }

    /// Load a previously saved tokenizer from its JSON file
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join("tokenizer.json");
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))
    }

    /// Build a word-level vocabulary from the corpus and write a
    /// valid tokenizer JSON directly.
    fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir).ok();

        // ── Step 1: Count word frequencies across the corpus ──────────────────
        use std::collections::HashMap;
        let mut freq: HashMap<String, usize> = HashMap::new();

        for text in texts {
            for word in text.split_whitespace() {
                let w = word.to_lowercase();
                let w = w.trim_matches(|c: char| !c.is_alphanumeric());
                if !w.is_empty() {
                    *freq.entry(w.to_string()).or_insert(0) += 1;
                }
            }
        }

        // Sort by frequency descending. Word ids count up from
        // FIRST_WORD_ID, so only vocab_size - FIRST_WORD_ID corpus
        // words fit below the embedding-table bound; everything
        // rarer maps to [UNK] at encode time.
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1));
        let max_words = vocab_size.saturating_sub(FIRST_WORD_ID);
        words.truncate(max_words);

        // ── Step 2: Build vocab JSON ──────────────────────────────────────────
        // Special tokens get fixed IDs matching BERT convention.
        // [CLS]/[SEP] bracket every sentence of an input sequence.
        let mut vocab = serde_json::json!({
            "[PAD]":  0,
            "[UNK]":  1,
            "[CLS]":  101,
            "[SEP]":  102,
            "[MASK]": 103,
        });

        let mut next_id = FIRST_WORD_ID;
        for (word, _) in &words {
            if vocab.get(word).is_none() {
                vocab[word] = serde_json::json!(next_id);
                next_id += 1;
            }
        }

        // ── Step 3: Write tokenizer JSON in HuggingFace format ────────────────
        // This format is what Tokenizer::from_file() expects
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0,   "content": "[PAD]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 1,   "content": "[UNK]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 101, "content": "[CLS]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 102, "content": "[SEP]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 103, "content": "[MASK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let tok_path = self.dir.join("tokenizer.json");
        std::fs::write(
            &tok_path,
            serde_json::to_string_pretty(&tokenizer_json)?
        ).with_context(|| "Cannot write tokenizer JSON")?;

        tracing::info!(
            "Tokenizer built with {} words, saved to '{}'",
            next_id,
            tok_path.display()
        );

        // Load back as a proper Tokenizer instance
        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("extsumm-tok-{}-{}", name, std::process::id()))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn corpus_ids_stay_below_the_embedding_table() {
        let dir = scratch_dir("bound");
        let store = TokenizerStore::new(dir.clone());

        // 20 distinct words, but only vocab_size - FIRST_WORD_ID = 6 fit
        let corpus: Vec<String> = (0..20).map(|i| format!("word{i}")).collect();
        let vocab_size = 110usize;
        store.load_or_build(&corpus, vocab_size).unwrap();

        let json: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(
                std::path::Path::new(&dir).join("tokenizer.json"),
            )
            .unwrap(),
        )
        .unwrap();
        let vocab = json["model"]["vocab"].as_object().unwrap();

        let max_id = vocab.values().map(|v| v.as_u64().unwrap()).max().unwrap();
        assert!(
            (max_id as usize) < vocab_size,
            "token id {max_id} would index past the {vocab_size}-row embedding table",
        );
        // 5 special tokens + the 6 words that fit
        assert_eq!(vocab.len(), 11);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn rare_words_fall_back_to_unk() {
        let dir = scratch_dir("unk");
        let store = TokenizerStore::new(dir.clone());

        let corpus: Vec<String> = (0..20).map(|i| format!("word{i}")).collect();
        let tokenizer = store.load_or_build(&corpus, 110).unwrap();

        // a word that cannot have made the truncated vocabulary
        let enc = tokenizer.encode("unseenword", false).unwrap();
        assert_eq!(enc.get_ids(), &[1]); // [UNK]

        std::fs::remove_dir_all(dir).ok();
    }
}
