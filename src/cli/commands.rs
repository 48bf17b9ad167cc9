// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `report`
// and all their configurable flags.
//
// Every script-time constant of a typical training script
// (epoch count, batch size, device, checkpoint interval,
// learning rate, paths) is a --flag here with a default, and
// the whole set converts into one explicit TrainConfig.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fine-tune the sentence extractor on a jsonl dataset
    Train(TrainArgs),

    /// Render the loss table and chart from a run's metrics CSV
    Report(ReportArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Path to the jsonl training file, one article record per line
    #[arg(long, default_value = "data/train.jsonl")]
    pub data_path: String,

    /// Directory for snapshots, tokenizer, config and metrics
    #[arg(long, default_value = "checkpoint")]
    pub checkpoint_dir: String,

    /// Resume from the snapshot in --checkpoint-dir if one exists
    #[arg(long)]
    pub resume: bool,

    /// Device preference: "auto" picks the best wgpu adapter
    /// (accelerator if available), "cpu" forces CPU
    #[arg(long, default_value = "auto")]
    pub device: String,

    /// Number of batches between persisted snapshots
    #[arg(long, default_value_t = 100)]
    pub save_step: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 2)]
    pub batch_size: usize,

    /// How fast the model learns — too high causes instability,
    /// too low causes slow convergence
    #[arg(long, default_value_t = 5e-5)]
    pub lr: f64,

    /// Maximum number of tokens per input sequence
    /// Format: [CLS] sent [SEP] [CLS] sent [SEP] ... + padding
    #[arg(long, default_value_t = 512)]
    pub max_seq_len: usize,

    /// Maximum number of sentences scored per document
    #[arg(long, default_value_t = 32)]
    pub max_sents: usize,

    /// Hidden dimension of the encoder (d_model in the paper)
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// Number of attention heads in multi-head attention
    /// d_model must be divisible by num_heads
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    /// Number of stacked encoder layers
    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    /// Typically 4x d_model
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    /// Dropout probability — randomly zeroes activations during training
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Total number of unique tokens the model can recognise
    #[arg(long, default_value_t = 8000)]
    pub vocab_size: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:      a.data_path,
            checkpoint_dir: a.checkpoint_dir,
            resume:         a.resume,
            device:         a.device,
            save_step:      a.save_step,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            max_seq_len:    a.max_seq_len,
            max_sents:      a.max_sents,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            d_ff:           a.d_ff,
            dropout:        a.dropout,
            vocab_size:     a.vocab_size,
        }
    }
}

/// All arguments for the `report` command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Directory where a previous run wrote its metrics.csv
    #[arg(long, default_value = "checkpoint")]
    pub checkpoint_dir: String,
}
