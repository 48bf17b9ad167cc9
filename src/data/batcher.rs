// ============================================================
// Layer 4 — Extraction Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<SummSample>
// into device-resident tensors.
//
// Input:  Vec of N SummSamples, token sequences of length S,
//         per-sentence vectors of length M (all pre-padded)
// Output: SummBatch with tensors [N, S] and [N, M]
//
// Batching is a flatten + reshape because padding already
// happened at sample-build time. The batch size is constant
// except possibly for the final batch of an epoch.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::SummSample;

// ─── SummBatch ────────────────────────────────────────────────────────────────
/// A batch of extraction samples ready for the model forward pass.
/// All tensors have batch_size as their first dimension.
///
/// B is the Burn Backend (e.g. Wgpu, NdArray) —
/// generic so the same batcher works on any device.
#[derive(Debug, Clone)]
pub struct SummBatch<B: Backend> {
    /// Token ID sequences — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// Position of each sentence's [CLS] token — shape: [batch_size, max_sents]
    pub cls_positions: Tensor<B, 2, Int>,

    /// Per-sentence extraction labels (0.0 / 1.0) — shape: [batch_size, max_sents]
    pub labels: Tensor<B, 2>,

    /// 1.0 for real sentences, 0.0 for padding — shape: [batch_size, max_sents]
    pub sentence_mask: Tensor<B, 2>,
}

// ─── SummBatcher ──────────────────────────────────────────────────────────────
/// The batcher struct — holds the target device so tensors
/// are created on the correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct SummBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SummBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

// The DataLoader calls .batch(items) with each mini-batch of samples.
impl<B: Backend> Batcher<SummSample, SummBatch<B>> for SummBatcher<B> {
    fn batch(&self, items: Vec<SummSample>) -> SummBatch<B> {
        let batch_size = items.len();
        // All sequences have the same length (pre-padded)
        let seq_len   = items[0].input_ids.len();
        let max_sents = items[0].cls_positions.len();

        // Flatten Vec<Vec<_>> into one row-major Vec per field
        // (Burn uses i32 for Int tensors)
        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.input_ids.iter().map(|&x| x as i32))
            .collect();

        let cls_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.cls_positions.iter().map(|&p| p as i32))
            .collect();

        let label_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.labels.iter().copied())
            .collect();

        let mask_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.sentence_mask.iter().copied())
            .collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(
            input_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let cls_positions = Tensor::<B, 1, Int>::from_ints(
            cls_flat.as_slice(), &self.device
        ).reshape([batch_size, max_sents]);

        let labels = Tensor::<B, 1>::from_floats(
            label_flat.as_slice(), &self.device
        ).reshape([batch_size, max_sents]);

        let sentence_mask = Tensor::<B, 1>::from_floats(
            mask_flat.as_slice(), &self.device
        ).reshape([batch_size, max_sents]);

        SummBatch {
            input_ids,
            cls_positions,
            labels,
            sentence_mask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    fn sample(label: f32) -> SummSample {
        SummSample {
            input_ids:     vec![101, 5, 102, 0],
            cls_positions: vec![0, 0],
            labels:        vec![label, 0.0],
            sentence_mask: vec![1.0, 0.0],
        }
    }

    #[test]
    fn stacks_samples_into_batch_tensors() {
        let batcher = SummBatcher::<TestBackend>::new(Default::default());
        let batch = batcher.batch(vec![sample(1.0), sample(0.0), sample(1.0)]);

        assert_eq!(batch.input_ids.dims(), [3, 4]);
        assert_eq!(batch.cls_positions.dims(), [3, 2]);
        assert_eq!(batch.labels.dims(), [3, 2]);
        assert_eq!(batch.sentence_mask.dims(), [3, 2]);
    }
}
