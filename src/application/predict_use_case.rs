// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Classifies one video with a previously trained model:
//
//   Step 1: Load the saved training config   (Layer 6 - infra)
//   Step 2: Load the class manifest          (Layer 6 - infra)
//   Step 3: Rebuild the model from the best
//           checkpoint                       (Layer 5 - ml)
//   Step 4: Sample the clip with the same
//           parameters used at training time (Layer 4 - data)
//   Step 5: Run the forward pass             (Layer 5 - ml)
//
// The sampler parameters (frame size, depth, color, skip) come
// from train_config.json, never from the command line — the clip
// must be shaped exactly like the training data.

use anyhow::{anyhow, Result};
use std::path::Path;

use crate::data::sampler::FrameSampler;
use crate::domain::traits::ClipSource;
use crate::infra::{checkpoint::CheckpointManager, manifest::ManifestStore};
use crate::ml::inferencer::{Inferencer, Prediction};

pub struct PredictUseCase {
    output_dir: String,
}

impl PredictUseCase {
    pub fn new(output_dir: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Classify the video at `video_path`.
    pub fn classify(&self, video_path: &str) -> Result<Prediction> {
        let ckpt_manager = CheckpointManager::new(self.output_dir.as_str());
        let cfg = ckpt_manager.load_config()?;

        let class_names = ManifestStore::new(self.output_dir.as_str()).load()?;
        let inferencer = Inferencer::from_checkpoint(&ckpt_manager, class_names.len())?;

        let sampler = FrameSampler::new(cfg.frame_size, cfg.frame_size, cfg.depth);
        let clip = sampler
            .sample(Path::new(video_path), cfg.color, cfg.skip)
            .map_err(|e| anyhow!("cannot sample '{video_path}': {e}"))?;

        inferencer.predict(&clip, &class_names)
    }
}
