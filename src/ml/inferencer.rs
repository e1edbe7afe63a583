// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::Result;
use burn::prelude::*;

use crate::domain::clip::ClipTensor;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{ActionCnnConfig, ActionCnnModel};

type InferBackend = burn::backend::Wgpu;

/// A classification for one clip.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub class_index: usize,
    pub class_name: String,
    pub probability: f32,
}

pub struct Inferencer {
    model: ActionCnnModel<InferBackend>,
    device: burn::backend::wgpu::WgpuDevice,
}

impl Inferencer {
    /// Rebuild the trained model from the saved config and the
    /// best checkpoint. Dropout is zeroed — inference never drops
    /// activations.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, num_classes: usize) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        let cfg = ckpt_manager.load_config()?;
        let channels = if cfg.color { 3 } else { 1 };

        let model_cfg = ActionCnnConfig::new(num_classes, cfg.frame_size, cfg.depth, channels)
            .with_conv_dropout(0.0)
            .with_dense_dropout(0.0);
        let model: ActionCnnModel<InferBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");

        Ok(Self { model, device })
    }

    /// Classify one sampled clip. Returns the highest-probability
    /// class under a softmax over the logits.
    pub fn predict(&self, clip: &ClipTensor, class_names: &[String]) -> Result<Prediction> {
        // [depth, H, W, C] → [1, H, W, depth, C], cast to f32
        let per_sample = clip
            .frames()
            .view()
            .permuted_axes([1, 2, 0, 3])
            .as_standard_layout()
            .mapv(|v| v as f32);
        let shape = [
            1,
            clip.height(),
            clip.width(),
            clip.depth(),
            clip.channels(),
        ];
        let flat: Vec<f32> = per_sample.iter().copied().collect();

        let input = Tensor::<InferBackend, 1>::from_floats(flat.as_slice(), &self.device)
            .reshape(shape);

        let logits = self.model.forward(input);
        let probabilities: Vec<f32> = burn::tensor::activation::softmax(logits, 1)
            .flatten::<1>(0, 1)
            .into_data()
            .to_vec::<f32>()
            .unwrap_or_default();

        let (class_index, probability) = probabilities
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| anyhow::anyhow!("model produced no probabilities"))?;

        let class_name = class_names
            .get(class_index)
            .cloned()
            .unwrap_or_else(|| format!("class {class_index}"));

        tracing::debug!(
            "Predicted class {} ('{}') p={:.4}",
            class_index,
            class_name,
            probability
        );

        Ok(Prediction {
            class_index,
            class_name,
            probability,
        })
    }
}
