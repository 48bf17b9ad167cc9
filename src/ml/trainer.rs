// ============================================================
// Layer 5 — Training Loop
// ============================================================
// The epoch driver and the outer orchestrator.
//
// The driver runs exactly one epoch: pull batches, forward,
// record the loss, backward, Adam step, and persist a full
// training snapshot every `save_step` batches (and at the end
// of the epoch). The orchestrator runs the driver once per
// epoch, optionally restoring epoch/step offsets and the loss
// history from a previous run's snapshot.
//
// Key Burn insight:
//   - Training uses TrainBackend (Autodiff<Wgpu>) so that
//     loss.backward() can produce gradients; dropout is active
//     on the autodiff backend.
//   - The optimiser is stepped functionally: it consumes the
//     model and returns the updated one.
//
// Failure semantics: any error during forward/backward or a
// snapshot write propagates via `?` and aborts the run. The
// last snapshot written stays on disk as the resumption point.

use anyhow::Result;
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::train_use_case::TrainConfig;
use crate::data::batcher::{SummBatch, SummBatcher};
use crate::data::dataset::SummDataset;
use crate::infra::checkpoint::{CheckpointManager, TrainState};
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::infra::report;
use crate::ml::model::{SentExtractConfig, SentExtractModel};

type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Map the configured device preference onto a wgpu device.
/// "auto" lets wgpu pick the best available adapter, which
/// prefers an accelerator and falls back to CPU on its own.
pub fn select_device(preference: &str) -> burn::backend::wgpu::WgpuDevice {
    match preference {
        "cpu" => burn::backend::wgpu::WgpuDevice::Cpu,
        _     => burn::backend::wgpu::WgpuDevice::default(),
    }
}

pub fn run_training(
    cfg:          &TrainConfig,
    dataset:      SummDataset,
    ckpt_manager: CheckpointManager,
) -> Result<()> {
    let device = select_device(&cfg.device);
    tracing::info!("Using WGPU device: {:?}", device);

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = SentExtractConfig::new(
        cfg.vocab_size, cfg.max_seq_len, cfg.d_model,
        cfg.num_heads, cfg.num_layers, cfg.d_ff, cfg.dropout,
    );
    let mut model: SentExtractModel<TrainBackend> = model_cfg.init(&device);
    tracing::info!("Model ready: {} layers, d_model={}", cfg.num_layers, cfg.d_model);

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Resume from a previous snapshot, if requested ─────────────────────────
    // A missing or corrupt snapshot is the "no checkpoint"
    // condition: warn and start from epoch 0, step 0, empty
    // loss history.
    let mut start_epoch    = 0usize;
    let mut resume_step    = 0usize;
    let mut resumed_losses = Vec::new();
    if cfg.resume {
        match ckpt_manager.load_state()? {
            Some(state) => {
                model = ckpt_manager.load_model(model, &device)?;
                optim = optim.load_record(ckpt_manager.load_optimizer(&device)?);
                tracing::info!(
                    "Resuming: epoch={}, step={}/{}, last_loss={:.3}",
                    state.epoch, state.train_step, state.total_train_step, state.last_loss,
                );
                (start_epoch, resume_step, resumed_losses) = resume_offsets(&state);
            }
            None => {
                tracing::warn!(
                    "No usable snapshot in '{}', starting fresh",
                    cfg.checkpoint_dir,
                );
            }
        }
    }

    // ── Training data loader ──────────────────────────────────────────────────
    let batcher = SummBatcher::<TrainBackend>::new(device.clone());
    let loader  = DataLoaderBuilder::new(batcher)
        .batch_size(cfg.batch_size)
        .shuffle(42)
        .num_workers(1)
        .build(dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    // The resume offsets apply to the first epoch only; every
    // subsequent epoch starts at step 0 with a fresh history.
    let logger = MetricsLogger::new(&cfg.checkpoint_dir)?;
    let mut epoch_means = Vec::with_capacity(cfg.epochs);

    for step in 0..cfg.epochs {
        let epoch  = step + start_epoch;
        let offset = std::mem::take(&mut resume_step);
        let seeded = std::mem::take(&mut resumed_losses);

        let (updated_model, updated_optim, mean_loss) = train_epoch(
            epoch, model, optim, loader.as_ref(), cfg, &ckpt_manager, offset, seeded,
        )?;
        model = updated_model;
        optim = updated_optim;

        logger.log(&EpochMetrics::new(epoch, mean_loss))?;
        epoch_means.push(mean_loss);
    }

    // ── End-of-run report: loss table + chart ─────────────────────────────────
    report::render(&epoch_means);

    tracing::info!("Training complete!");
    Ok(())
}

/// Run one epoch over the batch sequence, starting `resume_step`
/// batches in. `losses` carries the per-batch loss history of
/// this epoch so far (restored from a snapshot when resuming,
/// empty otherwise).
///
/// Returns the updated model and optimiser together with the
/// arithmetic mean of the epoch's full loss history. An epoch
/// with zero batches returns NaN, matching the empty-set mean.
#[allow(clippy::too_many_arguments)]
fn train_epoch<O>(
    epoch:       usize,
    mut model:   SentExtractModel<TrainBackend>,
    mut optim:   O,
    loader:      &dyn DataLoader<SummBatch<TrainBackend>>,
    cfg:         &TrainConfig,
    ckpt:        &CheckpointManager,
    resume_step: usize,
    mut losses:  Vec<f64>,
) -> Result<(SentExtractModel<TrainBackend>, O, f64)>
where
    O: Optimizer<SentExtractModel<TrainBackend>, TrainBackend>,
{
    let total = batch_count(loader.num_items(), cfg.batch_size);
    tracing::info!(
        "Epoch {}: {} of {} batches to run",
        epoch,
        remaining_batches(total, resume_step),
        total,
    );

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template("{prefix} [{bar:40}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_prefix(format!("Train({epoch})"));
    pb.set_position(resume_step as u64);

    let mut step = resume_step;
    for batch in loader.iter().skip(resume_step) {
        step += 1;

        let (loss, _logits) = model.forward_loss(
            batch.input_ids,
            batch.cls_positions,
            batch.labels,
            batch.sentence_mask,
        );

        let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
        losses.push(loss_val);

        // Backward pass + Adam update
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(cfg.lr, model, grads);

        pb.inc(1);
        pb.set_message(format!("Loss: {:.3} ({:.3})", loss_val, mean(&losses)));

        if should_checkpoint(step, total, cfg.save_step) {
            let state = TrainState {
                epoch,
                last_loss:        loss_val,
                losses:           losses.clone(),
                train_step:       step,
                total_train_step: total,
            };
            ckpt.save_snapshot(&model, optim.to_record(), &state)?;
            tracing::debug!("Snapshot written at step {}/{}", step, total);
        }
    }
    pb.finish_and_clear();

    Ok((model, optim, mean(&losses)))
}

/// Offsets a restored snapshot implies for the next run. A
/// mid-epoch snapshot continues its epoch from where it stopped,
/// carrying the loss history; an end-of-epoch snapshot means that
/// epoch is finished, so the run starts the next one fresh rather
/// than replaying the finished epoch as a zero-batch no-op.
pub(crate) fn resume_offsets(state: &TrainState) -> (usize, usize, Vec<f64>) {
    if state.train_step == state.total_train_step {
        (state.epoch + 1, 0, Vec::new())
    } else {
        (state.epoch, state.train_step, state.losses.clone())
    }
}

/// Number of batches an epoch yields for `num_items` samples.
pub(crate) fn batch_count(num_items: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        0
    } else {
        num_items.div_ceil(batch_size)
    }
}

/// Snapshot cadence, with `step` 1-based within the epoch:
/// write at every multiple of the interval and at the final
/// batch of the epoch.
pub(crate) fn should_checkpoint(step: usize, total: usize, interval: usize) -> bool {
    step == total || step % interval == 0
}

/// Batches left to process when resuming `resume_step` batches in.
pub(crate) fn remaining_batches(total: usize, resume_step: usize) -> usize {
    total.saturating_sub(resume_step)
}

/// Arithmetic mean in observation order; NaN for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_matches_observation_order_average() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(mean(&[0.5]), 0.5);
    }

    #[test]
    fn mean_of_zero_batches_is_nan() {
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn cadence_writes_at_interval_multiples_and_epoch_end() {
        // total = 250, interval = 100 → writes after 100, 200, 250
        let writes: Vec<usize> = (1..=250)
            .filter(|&i| should_checkpoint(i, 250, 100))
            .collect();
        assert_eq!(writes, vec![100, 200, 250]);
    }

    #[test]
    fn cadence_has_no_duplicate_when_total_is_a_multiple() {
        let writes: Vec<usize> = (1..=200)
            .filter(|&i| should_checkpoint(i, 200, 100))
            .collect();
        assert_eq!(writes, vec![100, 200]);
    }

    #[test]
    fn resume_processes_only_the_remaining_batches() {
        assert_eq!(remaining_batches(250, 0), 250);
        assert_eq!(remaining_batches(250, 100), 150);
        assert_eq!(remaining_batches(250, 250), 0);
        // resuming past the end never underflows
        assert_eq!(remaining_batches(250, 300), 0);
    }

    #[test]
    fn mid_epoch_snapshot_resumes_its_epoch() {
        let state = TrainState {
            epoch:            2,
            last_loss:        0.5,
            losses:           vec![0.9, 0.5],
            train_step:       2,
            total_train_step: 250,
        };
        assert_eq!(resume_offsets(&state), (2, 2, vec![0.9, 0.5]));
    }

    #[test]
    fn finished_epoch_snapshot_starts_the_next_epoch() {
        let state = TrainState {
            epoch:            2,
            last_loss:        0.5,
            losses:           vec![0.9; 250],
            train_step:       250,
            total_train_step: 250,
        };
        assert_eq!(resume_offsets(&state), (3, 0, Vec::new()));
    }

    #[test]
    fn batch_count_rounds_up_for_a_partial_final_batch() {
        assert_eq!(batch_count(500, 2), 250);
        assert_eq!(batch_count(501, 2), 251);
        assert_eq!(batch_count(0, 2), 0);
    }
}
