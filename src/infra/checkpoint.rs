// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved:
//   1. Model weights (.mpk.gz) — only when validation accuracy
//      improves, one file per improving epoch
//   2. best.json          — which epoch holds the best weights
//                           and what its validation accuracy was
//   3. train_config.json  — the full training configuration
//
// The config is saved separately because inference must rebuild
// the exact model architecture (frame size, depth, channels)
// before the weights can be loaded into it.
//
// Burn's CompactRecorder:
//   - Serialises model parameters to MessagePack format
//   - Compresses with gzip
//   - Type-safe: loading fails if the architecture doesn't match
//
// File naming convention:
//   output/
//     model_epoch_3.mpk.gz   ← weights from the epoch that
//     model_epoch_7.mpk.gz     improved validation accuracy
//     best.json              ← points at the best epoch
//     train_config.json      ← model + pipeline configuration

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::ActionCnnModel;

/// Pointer to the best checkpoint so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestCheckpoint {
    pub epoch: usize,
    pub val_accuracy: f64,
}

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save model weights for an epoch that improved validation
    /// accuracy, and update the best-checkpoint pointer.
    pub fn save_model<B: AutodiffBackend>(
        &self,
        model: &ActionCnnModel<B>,
        epoch: usize,
        val_accuracy: f64,
    ) -> Result<()> {
        // Recorder appends its own extension
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let best = BestCheckpoint {
            epoch,
            val_accuracy,
        };
        let best_path = self.dir.join("best.json");
        fs::write(&best_path, serde_json::to_string(&best)?)
            .with_context(|| "Failed to write best.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load model weights from the best saved checkpoint.
    ///
    /// The model parameter must have the correct architecture
    /// (matching the saved checkpoint) or loading will fail.
    pub fn load_model<B: Backend>(
        &self,
        model: ActionCnnModel<B>,
        device: &B::Device,
    ) -> Result<ActionCnnModel<B>> {
        let best = self.best_checkpoint()?;
        let path = self.dir.join(format!("model_epoch_{}", best.epoch));

        tracing::info!(
            "Loading checkpoint from epoch {} (val_acc={:.2}%)",
            best.epoch,
            best.val_accuracy * 100.0
        );

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    ///
    /// Must be called before training starts so inference can
    /// reconstruct the exact model architecture.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Read best.json and return the best checkpoint pointer.
    fn best_checkpoint(&self) -> Result<BestCheckpoint> {
        let path = self.dir.join("best.json");
        let s = fs::read_to_string(&path)
            .with_context(|| "Cannot find 'best.json'. Have you run 'train' first?")?;
        Ok(serde_json::from_str(&s)?)
    }
}
