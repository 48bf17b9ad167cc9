// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw jsonl file to GPU-ready tensor
// batches, one module per step:
//
//   train.jsonl
//       │
//       ▼
//   JsonlLoader       → parses one ArticleRecord per line
//       │
//       ▼
//   Preprocessor      → cleans sentence text
//       │
//       ▼
//   Tokenizer         → converts words to token ID numbers
//       │
//       ▼
//   SummDataset       → implements Burn's Dataset trait
//       │
//       ▼
//   SummBatcher       → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step, which
// makes each step independently testable and replaceable.

/// Loads jsonl article records from disk
pub mod loader;

/// Cleans and normalises sentence text
pub mod preprocessor;

/// Implements Burn's Dataset trait for extraction samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
