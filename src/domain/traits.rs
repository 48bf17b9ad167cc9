// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// By programming against traits instead of concrete types,
// we can swap implementations without changing the code that
// uses them:
//   - JsonlLoader implements RecordSource
//   - a future ParquetLoader could implement it too
//   - the application layer only ever sees RecordSource

use anyhow::Result;
use crate::domain::record::ArticleRecord;

/// Any component that can produce the training records.
///
/// Implementations:
///   - JsonlLoader → reads a line-delimited JSON file
pub trait RecordSource {
    /// Load all available records from this source.
    fn load_all(&self) -> Result<Vec<ArticleRecord>>;
}
