// ============================================================
// Layer 4 — Clip Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<ClipSample>
// into GPU-ready tensors.
//
// How batching works here:
//   Input:  Vec of N ClipSamples, each a flat [H,W,D,C] clip
//   Output: ClipBatch with a [N,H,W,D,C] float tensor and a [N]
//           integer target tensor
//
//   All clips in a dataset share one shape (the sampler resizes
//   every frame to the same square), so batching is a flatten
//   and a reshape — no padding pass is needed.

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::ClipSample;

// ─── ClipBatch ────────────────────────────────────────────────────────────────
/// A batch of clips ready for the model forward pass.
///
/// B is the Burn Backend (e.g. Wgpu, NdArray) —
/// generic so the same batcher works on any device.
#[derive(Debug, Clone)]
pub struct ClipBatch<B: Backend> {
    /// Pixel tensor — shape: [batch_size, H, W, depth, C]
    pub clips: Tensor<B, 5>,

    /// Ground truth class ids — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── ClipBatcher ──────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created where the
/// model runs.
#[derive(Clone, Debug)]
pub struct ClipBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ClipBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ClipSample, ClipBatch<B>> for ClipBatcher<B> {
    fn batch(&self, items: Vec<ClipSample>) -> ClipBatch<B> {
        let batch_size = items.len();
        let [h, w, d, c] = items[0].shape;

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.frames.iter().copied())
            .collect();

        let clips = Tensor::<B, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape([batch_size, h, w, d, c]);

        let targets: Vec<i32> = items.iter().map(|s| s.label as i32).collect();
        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device);

        ClipBatch { clips, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_batch_shapes() {
        let device = Default::default();
        let batcher = ClipBatcher::<TestBackend>::new(device);

        let sample = |label: usize| ClipSample {
            frames: vec![0.5; 4 * 4 * 2],
            shape: [4, 4, 2, 1],
            label,
        };

        let batch = batcher.batch(vec![sample(0), sample(1), sample(1)]);
        assert_eq!(batch.clips.dims(), [3, 4, 4, 2, 1]);
        assert_eq!(batch.targets.dims(), [3]);
    }
}
