// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, built on the `clap`
// crate. All business logic is delegated to Layer 2
// (application).
//
// Two commands are supported:
//   1. `train`  — fine-tunes the sentence extractor, writing
//                 periodic snapshots it can resume from
//   2. `report` — re-renders the per-epoch loss table and
//                 chart from a previous run's metrics CSV

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, TrainArgs, ReportArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "extsumm",
    version = "0.1.0",
    about = "Fine-tune an extractive summarizer on line-delimited article records."
)]
pub struct Cli {
    /// The subcommand to run (train or report)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    /// Matching moves the args out of `self`, so the handlers are
    /// associated functions rather than methods.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)  => Self::run_train(args),
            Commands::Report(args) => Self::run_report(args),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on records in: {}", args.data_path);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Snapshot saved.");
        Ok(())
    }

    /// Handles the `report` subcommand.
    /// Reads the metrics CSV and prints the loss table + chart.
    fn run_report(args: ReportArgs) -> Result<()> {
        use crate::application::report_use_case::ReportUseCase;

        let use_case = ReportUseCase::new(args.checkpoint_dir);
        use_case.execute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_args_parse_into_the_command() {
        let cli = Cli::parse_from(["extsumm", "train", "--epochs", "3", "--resume"]);
        match cli.command {
            Commands::Train(args) => {
                assert_eq!(args.epochs, 3);
                assert!(args.resume);
            }
            _ => panic!("expected the train subcommand"),
        }
    }

    #[test]
    fn report_on_a_missing_run_fails_cleanly() {
        let cli = Cli::parse_from([
            "extsumm", "report", "--checkpoint-dir", "definitely/not/here",
        ]);
        assert!(cli.run().is_err());
    }
}
