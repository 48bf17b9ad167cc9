// ============================================================
// Layer 2 — ReportUseCase
// ============================================================
// Re-renders the per-epoch loss table and chart from the
// metrics CSV a previous run wrote, without touching the model
// or the dataset.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::infra::{metrics, report};

pub struct ReportUseCase {
    checkpoint_dir: String,
}

impl ReportUseCase {
    pub fn new(checkpoint_dir: String) -> Self {
        Self { checkpoint_dir }
    }

    pub fn execute(&self) -> Result<()> {
        let path = PathBuf::from(&self.checkpoint_dir).join("metrics.csv");
        let text = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read metrics from '{}'. Has a training run finished an epoch?",
                path.display()
            )
        })?;

        let losses = metrics::parse_losses(&text)?;
        anyhow::ensure!(
            !losses.is_empty(),
            "metrics file '{}' holds no completed epochs yet",
            path.display(),
        );

        report::render(&losses);
        Ok(())
    }
}
