// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits defining the core concepts
// of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits
//
// Keeping this layer pure means it is testable without a GPU
// and understandable without framework knowledge.

// A raw article with its extraction labels
pub mod record;

// Core abstractions (traits) that other layers implement
pub mod traits;
