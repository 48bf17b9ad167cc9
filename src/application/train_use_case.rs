// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load jsonl records         (Layer 4 - data)
//   Step 2: Clean sentence text        (Layer 4 - data)
//   Step 3: Build / load tokenizer     (Layer 6 - infra)
//   Step 4: Build training samples     (here)
//   Step 5: Build Burn dataset         (Layer 4 - data)
//   Step 6: Save config                (Layer 6 - infra)
//   Step 7: Run training loop          (Layer 5 - ml)
//
// The training loop itself owns resumption: if the config asks
// for it, the trainer restores the snapshot before epoch 0.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::{SummDataset, SummSample},
    loader::JsonlLoader,
    preprocessor::Preprocessor,
};
use crate::domain::record::ArticleRecord;
use crate::domain::traits::RecordSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    tokenizer_store::TokenizerStore,
};
use crate::ml::trainer::run_training;

// BERT-convention special token ids, fixed by the tokenizer store
const PAD_ID: u32 = 0;
const CLS_ID: u32 = 101;
const SEP_ID: u32 = 102;

// ─── Training Configuration ──────────────────────────────────────────────────
// Every parameter of a run, in one explicit structure.
// Serialisable so it can be saved next to the snapshots and
// inspected (or rebuilt from) later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:      String,
    pub checkpoint_dir: String,
    pub resume:         bool,
    pub device:         String,
    pub save_step:      usize,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
    pub max_seq_len:    usize,
    pub max_sents:      usize,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub num_layers:     usize,
    pub d_ff:           usize,
    pub dropout:        f64,
    pub vocab_size:     usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:      "data/train.jsonl".to_string(),
            checkpoint_dir: "checkpoint".to_string(),
            resume:         false,
            device:         "auto".to_string(),
            save_step:      100,
            epochs:         5,
            batch_size:     2,
            lr:             5e-5,
            max_seq_len:    512,
            max_sents:      32,
            d_model:        256,
            num_heads:      8,
            num_layers:     6,
            d_ff:           1024,
            dropout:        0.1,
            vocab_size:     8000,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        anyhow::ensure!(cfg.save_step >= 1, "save_step must be at least 1");
        anyhow::ensure!(cfg.batch_size >= 1, "batch_size must be at least 1");
        anyhow::ensure!(
            cfg.d_model % cfg.num_heads == 0,
            "d_model ({}) must be divisible by num_heads ({})",
            cfg.d_model, cfg.num_heads,
        );

        // ── Step 1: Load the jsonl records ────────────────────────────────────
        tracing::info!("Loading records from '{}'", cfg.data_path);
        let loader  = JsonlLoader::new(&cfg.data_path);
        let records = loader.load_all()?;
        tracing::info!("Loaded {} article records", records.len());

        // ── Step 2: Clean sentence text in place ──────────────────────────────
        // Sentence indices stay stable so extraction labels keep
        // pointing at the right sentences.
        let preprocessor = Preprocessor::new();
        let records: Vec<ArticleRecord> = records
            .into_iter()
            .map(|mut r| {
                for s in r.sentences.iter_mut() {
                    *s = preprocessor.clean(s);
                }
                r
            })
            .collect();

        // ── Step 3: Build / load tokenizer ────────────────────────────────────
        // A resumed run loads the saved vocabulary and tokenises
        // identically to the run that wrote the snapshot.
        let corpus: Vec<String> = records
            .iter()
            .flat_map(|r| r.sentences.iter().cloned())
            .collect();
        let tok_store = TokenizerStore::new(&cfg.checkpoint_dir);
        let tokenizer = tok_store.load_or_build(&corpus, cfg.vocab_size)?;

        // ── Step 4: Build training samples ────────────────────────────────────
        let samples = build_samples(&records, &tokenizer, cfg)?;
        anyhow::ensure!(
            !samples.is_empty(),
            "no usable training samples in '{}'",
            cfg.data_path,
        );
        tracing::info!("Built {} training samples", samples.len());

        // ── Step 5: Build the Burn dataset ────────────────────────────────────
        let dataset = SummDataset::new(samples);

        // ── Step 6: Save config next to the snapshots ─────────────────────────
        // Loading a snapshot into a differently shaped model
        // fails deep inside the recorder; catch it up front by
        // comparing against the config the snapshot was written
        // with.
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        if cfg.resume {
            if let Ok(saved) = ckpt_manager.load_config() {
                anyhow::ensure!(
                    saved.d_model == cfg.d_model
                        && saved.num_heads == cfg.num_heads
                        && saved.num_layers == cfg.num_layers
                        && saved.d_ff == cfg.d_ff
                        && saved.vocab_size == cfg.vocab_size
                        && saved.max_seq_len == cfg.max_seq_len
                        && saved.max_sents == cfg.max_sents,
                    "snapshot in '{}' was written with a different model architecture",
                    cfg.checkpoint_dir,
                );
            }
        }
        ckpt_manager.save_config(cfg)?;

        // ── Step 7: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, dataset, ckpt_manager)
    }
}

// ─── Sample Building ─────────────────────────────────────────────────────────
// Turns one ArticleRecord into one padded SummSample:
//
//   [CLS] sent0 [SEP] [CLS] sent1 [SEP] ... [PAD] [PAD]
//    ^pos0             ^pos1
//
// Each sentence's [CLS] position is recorded so the model can
// gather that hidden state as the sentence representation.
// Sentences past max_sents, or past the token budget, are
// dropped from the tail; padded sentence slots point at
// position 0 but carry mask 0.0 so they never reach the loss.
fn build_samples(
    records:   &[ArticleRecord],
    tokenizer: &tokenizers::Tokenizer,
    cfg:       &TrainConfig,
) -> Result<Vec<SummSample>> {
    let mut samples = Vec::with_capacity(records.len());

    for record in records {
        let mut input_ids: Vec<u32> = Vec::with_capacity(cfg.max_seq_len);
        let mut cls_positions: Vec<usize> = Vec::new();
        let mut labels: Vec<f32> = Vec::new();

        for (idx, sentence) in record.sentences.iter().enumerate() {
            if cls_positions.len() == cfg.max_sents {
                break;
            }
            // Room for [CLS], at least one token, and [SEP]
            if input_ids.len() + 3 > cfg.max_seq_len {
                break;
            }

            let enc = tokenizer
                .encode(sentence.as_str(), false)
                .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
            let ids = enc.get_ids();
            if ids.is_empty() {
                continue; // cleaned to nothing; labels stay index-aligned via `idx`
            }

            cls_positions.push(input_ids.len());
            labels.push(if record.is_extractive(idx) { 1.0 } else { 0.0 });

            input_ids.push(CLS_ID);
            let room = cfg.max_seq_len - input_ids.len() - 1;
            input_ids.extend(ids.iter().take(room));
            input_ids.push(SEP_ID);
        }

        if cls_positions.is_empty() {
            continue; // nothing tokenisable in this record
        }

        let mut sentence_mask: Vec<f32> = vec![1.0; cls_positions.len()];

        // Pad the token sequence and the per-sentence vectors
        while input_ids.len() < cfg.max_seq_len {
            input_ids.push(PAD_ID);
        }
        while cls_positions.len() < cfg.max_sents {
            cls_positions.push(0);
            labels.push(0.0);
            sentence_mask.push(0.0);
        }

        samples.push(SummSample { input_ids, cls_positions, labels, sentence_mask });
    }

    Ok(samples)
}
