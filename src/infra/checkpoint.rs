// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Persists and restores a full training snapshot so a long
// job can resume from an arbitrary mid-epoch position.
//
// One snapshot is three fixed-path artifacts in the directory:
//   model.mpk      ← all model parameters (CompactRecorder)
//   optimizer.mpk  ← Adam per-parameter state (CompactRecorder)
//   state.json     ← progress: epoch, last loss, the per-batch
//                    loss history of the current epoch, the
//                    batch step reached, and the batch total
//
// Every write fully overwrites the previous snapshot — no
// versioning, no append. Writes go to a temp name first and
// are renamed into place, so a concurrent reader (e.g. a
// monitoring process) never observes a partially written file.
//
// The directory also holds train_config.json so a later run
// can rebuild the exact model architecture before loading the
// weights into it.
//
// Burn's CompactRecorder:
//   - Serialises records to MessagePack (.mpk) files
//   - Type-safe: loading fails if architecture doesn't match

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Record, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::SentExtractModel;

const MODEL_FILE: &str = "model";
const OPTIMIZER_FILE: &str = "optimizer";
const STATE_FILE: &str = "state.json";
const CONFIG_FILE: &str = "train_config.json";
// Set by CompactRecorder on the stems above
const RECORD_EXT: &str = "mpk";

/// Progress portion of a training snapshot. The model and
/// optimiser records live in companion files; together the
/// three artifacts round-trip every field of the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainState {
    /// Epoch the snapshot was taken in
    pub epoch: usize,

    /// Loss of the batch that triggered the write
    pub last_loss: f64,

    /// Per-batch losses of the current epoch, in observation
    /// order. Exactly `train_step` entries in every snapshot.
    pub losses: Vec<f64>,

    /// Batches completed in the current epoch (1-based count)
    pub train_step: usize,

    /// Total batches this epoch yields
    pub total_train_step: usize,
}

impl TrainState {
    /// Snapshot invariants: the step never exceeds the total
    /// and the history holds one loss per completed batch.
    /// A state violating these is treated as corrupt.
    pub fn is_consistent(&self) -> bool {
        self.train_step <= self.total_train_step
            && self.losses.len() == self.train_step
    }
}

/// Manages saving and loading of training snapshots.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Persist a full snapshot: model record, optimiser record,
    /// progress state. Any write failure propagates — the caller
    /// aborts and the previous snapshot stays authoritative.
    pub fn save_snapshot<B, R>(
        &self,
        model:     &SentExtractModel<B>,
        optimizer: R,
        state:     &TrainState,
    ) -> Result<()>
    where
        B: AutodiffBackend,
        R: Record<B>,
    {
        self.record_atomic::<B, _>(model.clone().into_record(), MODEL_FILE)?;
        self.record_atomic::<B, _>(optimizer, OPTIMIZER_FILE)?;
        self.write_state(state)
    }

    /// Load the progress state of the last snapshot.
    /// Ok(None) is the "no checkpoint" condition: the file is
    /// missing, unparseable, or violates the snapshot
    /// invariants. The caller then starts from scratch.
    pub fn load_state(&self) -> Result<Option<TrainState>> {
        let path = self.dir.join(STATE_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read snapshot state '{}'", path.display()))?;

        match serde_json::from_str::<TrainState>(&text) {
            Ok(state) if state.is_consistent() => Ok(Some(state)),
            Ok(state) => {
                tracing::warn!(
                    "Inconsistent snapshot state '{}' (step {}/{} with {} losses), ignoring",
                    path.display(), state.train_step, state.total_train_step, state.losses.len(),
                );
                Ok(None)
            }
            Err(err) => {
                tracing::warn!("Corrupt snapshot state '{}': {}", path.display(), err);
                Ok(None)
            }
        }
    }

    /// Load model weights from the last snapshot into a freshly
    /// initialised model of the same architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  SentExtractModel<B>,
        device: &B::Device,
    ) -> Result<SentExtractModel<B>> {
        let path = self.dir.join(MODEL_FILE);
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load model record '{}'", path.display())
            })?;
        Ok(model.load_record(record))
    }

    /// Load the optimiser record from the last snapshot. The
    /// record type is inferred at the call site from the
    /// optimiser it is loaded into.
    pub fn load_optimizer<B, R>(&self, device: &B::Device) -> Result<R>
    where
        B: Backend,
        R: Record<B>,
    {
        let path = self.dir.join(OPTIMIZER_FILE);
        CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load optimizer record '{}'", path.display())
            })
    }

    /// Save the training configuration to JSON.
    /// Called before training starts so a later run can verify
    /// and rebuild the exact model architecture.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. Has a training run been started?",
                    path.display()
                )
            })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Record a burn record under a temp stem, then rename the
    /// produced file into place. The temp stem must stay free of
    /// dots: the recorder applies its extension with
    /// `set_extension`, which would swallow a ".tmp" suffix.
    fn record_atomic<B, R>(&self, record: R, stem: &str) -> Result<()>
    where
        B: Backend,
        R: Record<B>,
    {
        let tmp_stem = format!("{stem}-tmp");
        let tmp_path = self.dir.join(&tmp_stem);
        CompactRecorder::new()
            .record(record, tmp_path.clone())
            .with_context(|| {
                format!("Failed to write snapshot record '{}'", tmp_path.display())
            })?;

        let from = self.dir.join(format!("{tmp_stem}.{RECORD_EXT}"));
        let to   = self.dir.join(format!("{stem}.{RECORD_EXT}"));
        fs::rename(&from, &to).with_context(|| {
            format!("Failed to move snapshot record into place at '{}'", to.display())
        })?;
        Ok(())
    }

    /// Write the progress state atomically (temp + rename).
    fn write_state(&self, state: &TrainState) -> Result<()> {
        let tmp  = self.dir.join(format!("{STATE_FILE}.tmp"));
        let path = self.dir.join(STATE_FILE);
        fs::write(&tmp, serde_json::to_string_pretty(state)?)
            .with_context(|| format!("Failed to write snapshot state '{}'", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| {
            format!("Failed to move snapshot state into place at '{}'", path.display())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> String {
        let dir = std::env::temp_dir()
            .join(format!("extsumm-{}-{}", name, std::process::id()));
        dir.to_string_lossy().into_owned()
    }

    fn sample_state() -> TrainState {
        TrainState {
            epoch:            3,
            last_loss:        0.42,
            losses:           vec![0.9, 0.6, 0.42],
            train_step:       3,
            total_train_step: 250,
        }
    }

    #[test]
    fn state_round_trips_every_field() {
        let dir = scratch_dir("roundtrip");
        let mgr = CheckpointManager::new(dir.clone());

        let written = sample_state();
        mgr.write_state(&written).unwrap();
        let restored = mgr.load_state().unwrap().unwrap();
        assert_eq!(restored, written);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_state_is_no_checkpoint() {
        let dir = scratch_dir("missing");
        let mgr = CheckpointManager::new(dir.clone());
        assert!(mgr.load_state().unwrap().is_none());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn corrupt_state_is_no_checkpoint() {
        let dir = scratch_dir("corrupt");
        let mgr = CheckpointManager::new(dir.clone());
        std::fs::write(
            std::path::Path::new(&dir).join(STATE_FILE),
            "definitely { not json",
        )
        .unwrap();
        assert!(mgr.load_state().unwrap().is_none());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn inconsistent_state_is_no_checkpoint() {
        let dir = scratch_dir("inconsistent");
        let mgr = CheckpointManager::new(dir.clone());
        // claims step 5 but carries only 2 losses
        let bad = TrainState {
            epoch:            0,
            last_loss:        1.0,
            losses:           vec![1.2, 1.0],
            train_step:       5,
            total_train_step: 10,
        };
        mgr.write_state(&bad).unwrap();
        assert!(mgr.load_state().unwrap().is_none());
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn snapshot_records_round_trip_on_disk() {
        use burn::optim::{AdamConfig, GradientsParams, Optimizer};
        use crate::ml::model::SentExtractConfig;

        type TestBackend = burn::backend::Autodiff<burn::backend::NdArray>;

        let dir = scratch_dir("records");
        let mgr = CheckpointManager::new(dir.clone());
        let device = Default::default();

        let model_cfg = SentExtractConfig::new(50, 16, 8, 2, 1, 16, 0.0);
        let model: SentExtractModel<TestBackend> = model_cfg.init(&device);
        let mut optim = AdamConfig::new()
            .init::<TestBackend, SentExtractModel<TestBackend>>();

        // One optimiser step so the Adam record carries real state
        let input  = Tensor::<TestBackend, 2, Int>::zeros([1, 16], &device);
        let cls    = Tensor::<TestBackend, 2, Int>::zeros([1, 2], &device);
        let labels = Tensor::<TestBackend, 2>::from_floats([[1.0, 0.0]], &device);
        let mask   = Tensor::<TestBackend, 2>::from_floats([[1.0, 1.0]], &device);
        let (loss, _) = model.forward_loss(input, cls, labels, mask);
        let grads = GradientsParams::from_grads(loss.backward(), &model);
        let model = optim.step(1e-3, model, grads);

        mgr.save_snapshot(&model, optim.to_record(), &sample_state())
            .unwrap();

        // the records land at their final names, no temp files left
        let base = std::path::Path::new(&dir);
        assert!(base.join("model.mpk").exists());
        assert!(base.join("optimizer.mpk").exists());
        assert!(!base.join("model-tmp.mpk").exists());
        assert!(!base.join("optimizer-tmp.mpk").exists());

        let restored = mgr
            .load_model(model_cfg.init::<TestBackend>(&device), &device)
            .unwrap();
        let _optim = optim.load_record(mgr.load_optimizer(&device).unwrap());

        let written  = model.extract_head.weight.val().into_data();
        let reloaded = restored.extract_head.weight.val().into_data();
        assert_eq!(written, reloaded);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn history_length_tracks_step() {
        let state = sample_state();
        assert!(state.is_consistent());
        assert_eq!(state.losses.len(), state.train_step);

        let mut over = sample_state();
        over.train_step = over.total_train_step + 1;
        assert!(!over.is_consistent());
    }
}
