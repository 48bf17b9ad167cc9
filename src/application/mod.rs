// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish a
// specific goal (training, or re-rendering a report).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here (that's Layer 1)
//   - No direct tensor work (that's Layer 5)
//   - Only workflow coordination

// The training workflow
pub mod train_use_case;

// The loss-report workflow
pub mod report_use_case;
