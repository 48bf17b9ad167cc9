// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly, except the data
// pipeline's Dataset/Batcher impls.
//
// What's in this layer:
//
//   model.rs   — The transformer encoder with a per-sentence
//                extraction head:
//                • Token embeddings
//                • Positional embeddings
//                • Multi-head self-attention
//                • Feed-forward networks (GELU activation)
//                • Layer normalisation + residual connections
//                • [CLS]-gather extraction head (one logit per
//                  sentence) with masked binary cross-entropy
//
//   trainer.rs — The epoch driver and outer orchestrator:
//                forward pass, loss bookkeeping, backward pass,
//                optimiser step, snapshot cadence, and resume.

/// Transformer encoder + sentence extraction head
pub mod model;

/// Epoch driver, snapshot cadence, resume orchestration
pub mod trainer;
