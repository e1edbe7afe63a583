// ============================================================
// Layer 4 — Clip Dataset (Burn)
// ============================================================
// Bridges the cached ndarray pair into Burn's Dataset trait so
// the DataLoader can call .get(index) and .len() on it.

use burn::data::dataset::Dataset;
use ndarray::{Array2, Array5};

/// One training sample: a flattened `[H, W, depth, C]` clip and
/// its integer class id.
#[derive(Debug, Clone)]
pub struct ClipSample {
    /// Row-major pixel values in `[H, W, depth, C]` order.
    pub frames: Vec<f32>,
    /// The per-clip tensor shape `[H, W, depth, C]`.
    pub shape: [usize; 4],
    /// Class id — the row's argmax in the one-hot label matrix.
    pub label: usize,
}

/// Split the dataset arrays into per-clip samples.
///
/// Zipping the outer axes tolerates a legacy-mode feature surplus:
/// unlabeled trailing clips are simply not turned into samples.
pub fn samples_from_arrays(features: &Array5<f32>, labels: &Array2<f32>) -> Vec<ClipSample> {
    features
        .outer_iter()
        .zip(labels.outer_iter())
        .map(|(clip, row)| {
            let s = clip.shape();
            let label = row
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(index, _)| index)
                .unwrap_or(0);
            ClipSample {
                frames: clip.iter().copied().collect(),
                shape: [s[0], s[1], s[2], s[3]],
                label,
            }
        })
        .collect()
}

pub struct ClipDataset {
    samples: Vec<ClipSample>,
}

impl ClipDataset {
    pub fn new(samples: Vec<ClipSample>) -> Self {
        Self { samples }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Dataset<ClipSample> for ClipDataset {
    fn get(&self, index: usize) -> Option<ClipSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::cache::one_hot;
    use ndarray::Array5;

    #[test]
    fn test_samples_carry_shape_and_argmax_label() {
        let features = Array5::<f32>::ones((3, 4, 4, 2, 1));
        let labels = one_hot(&[1, 0, 1], 2);
        let samples = samples_from_arrays(&features, &labels);

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].shape, [4, 4, 2, 1]);
        assert_eq!(samples[0].frames.len(), 4 * 4 * 2);
        assert_eq!(samples[0].label, 1);
        assert_eq!(samples[1].label, 0);
    }

    #[test]
    fn test_feature_surplus_is_truncated() {
        // Legacy-mode archives can hold more clips than labels
        let features = Array5::<f32>::zeros((4, 2, 2, 2, 1));
        let labels = one_hot(&[0, 1], 2);
        assert_eq!(samples_from_arrays(&features, &labels).len(), 2);
    }

    #[test]
    fn test_dataset_trait_get_and_len() {
        let features = Array5::<f32>::zeros((2, 2, 2, 2, 1));
        let labels = one_hot(&[0, 1], 2);
        let dataset = ClipDataset::new(samples_from_arrays(&features, &labels));

        assert_eq!(dataset.len(), 2);
        assert!(dataset.get(1).is_some());
        assert!(dataset.get(2).is_none());
    }
}
