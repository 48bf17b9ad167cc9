// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by multiple layers:
//
//   checkpoint.rs      — The snapshot store. Persists the full
//                        training snapshot (model record,
//                        optimiser record, progress state) to
//                        fixed paths, atomically, and restores
//                        it for mid-epoch resumption.
//
//   tokenizer_store.rs — Tokenizer persistence. Builds a
//                        word-level vocabulary from the corpus
//                        if none exists, or loads the saved
//                        one, so training runs and resumed
//                        runs share the same vocabulary.
//
//   metrics.rs         — Per-epoch mean-loss CSV logger.
//
//   report.rs          — End-of-run console reporting: the
//                        loss table and a bar chart of mean
//                        loss per epoch.

/// Training snapshot persistence and restore
pub mod checkpoint;

/// Tokenizer building, saving, and loading
pub mod tokenizer_store;

/// Per-epoch loss CSV logger
pub mod metrics;

/// Console loss table + chart rendering
pub mod report;
