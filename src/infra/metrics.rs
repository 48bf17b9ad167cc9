// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records the mean training loss to a CSV file after each
// epoch. CSV so the learning curve opens directly in a
// spreadsheet, and so `extsumm report` can re-render the
// table and chart long after the run finished.
//
// Output file: <checkpoint_dir>/metrics.csv
//
// Example:
//   epoch,train_loss
//   0,3.124500
//   1,2.890100
//
// The file is appended to, never truncated, so a resumed run
// continues the same log.

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

const CSV_HEADER: &str = "epoch,train_loss";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch index (0-based, offset by a resumed snapshot)
    pub epoch: usize,

    /// Arithmetic mean of the epoch's per-batch losses.
    /// NaN for an epoch that processed zero batches.
    pub train_loss: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64) -> Self {
        Self { epoch, train_loss }
    }

    /// The CSV row for this epoch, without trailing newline
    pub fn csv_row(&self) -> String {
        format!("{},{:.6}", self.epoch, self.train_loss)
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{CSV_HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(f, "{}", m.csv_row())?;
        tracing::debug!("Logged epoch {}: train_loss={:.4}", m.epoch, m.train_loss);
        Ok(())
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

/// Parse the train_loss column out of a metrics CSV body,
/// one value per epoch in file order.
pub fn parse_losses(text: &str) -> Result<Vec<f64>> {
    let mut losses = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line_no == 0 || line.trim().is_empty() {
            continue; // header
        }
        let loss = line
            .split(',')
            .nth(1)
            .ok_or_else(|| anyhow::anyhow!("metrics row {} has no loss column", line_no + 1))?;
        losses.push(loss.trim().parse::<f64>()?);
    }
    Ok(losses)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_row_formatting() {
        let m = EpochMetrics::new(2, 2.5);
        assert_eq!(m.csv_row(), "2,2.500000");
    }

    #[test]
    fn parses_losses_back_out_of_the_csv() {
        let text = "epoch,train_loss\n0,3.124500\n1,2.890100\n";
        let losses = parse_losses(text).unwrap();
        assert_eq!(losses, vec![3.1245, 2.8901]);
    }

    #[test]
    fn rejects_rows_without_a_loss_column() {
        assert!(parse_losses("epoch,train_loss\n0\n").is_err());
    }
}
