use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One fully tokenised and padded training sample.
/// Sequence format: [CLS] sent [SEP] [CLS] sent [SEP] ... [PAD]...
/// with one [CLS] marking the start of each sentence.
///
/// The per-sentence vectors (`cls_positions`, `labels`,
/// `sentence_mask`) are padded to the same length; the mask is
/// 1.0 for real sentences and 0.0 for padding, so padded slots
/// contribute nothing to the loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummSample {
    pub input_ids:     Vec<u32>,
    pub cls_positions: Vec<usize>,
    pub labels:        Vec<f32>,
    pub sentence_mask: Vec<f32>,
}

impl SummSample {
    /// Number of real (unmasked) sentences in this sample
    pub fn sentence_count(&self) -> usize {
        self.sentence_mask.iter().filter(|&&m| m > 0.0).count()
    }
}

pub struct SummDataset {
    samples: Vec<SummSample>,
}

impl SummDataset {
    pub fn new(samples: Vec<SummSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<SummSample> for SummDataset {
    fn get(&self, index: usize) -> Option<SummSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_only_unmasked_sentences() {
        let s = SummSample {
            input_ids:     vec![101, 7, 102, 0],
            cls_positions: vec![0, 0, 0],
            labels:        vec![1.0, 0.0, 0.0],
            sentence_mask: vec![1.0, 0.0, 0.0],
        };
        assert_eq!(s.sentence_count(), 1);
    }

    #[test]
    fn dataset_get_is_bounds_checked() {
        let ds = SummDataset::new(vec![]);
        assert_eq!(ds.len(), 0);
        assert!(ds.get(0).is_none());
    }
}
