// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate directories        (configuration errors are
//                                        fatal before any work)
//   Step 2: Load or build the dataset   (Layer 4 - data)
//             cache hit  → deserialize the .npz and move on
//             cache miss → walk videos, sample clips, write the
//                          class manifest, encode, persist
//   Step 3: Split train/validation      (Layer 4 - data)
//   Step 4: Build Burn datasets         (Layer 4 - data)
//   Step 5: Save config                 (Layer 6 - infra)
//   Step 6: Run training loop           (Layer 5 - ml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    builder::{BuildOptions, DatasetBuilder},
    cache::{CacheKey, DatasetCache},
    dataset::{samples_from_arrays, ClipDataset},
    labeler::ClassLabeler,
    sampler::FrameSampler,
    splitter::split_train_val,
};
use crate::infra::{checkpoint::CheckpointManager, manifest::ManifestStore};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All knobs for a training run. Serialisable so it can be saved
// to disk and reloaded for inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub videos_dir: String,
    pub output_dir: String,
    pub nclass: usize,
    pub depth: usize,
    pub color: bool,
    pub skip: bool,
    pub frame_size: usize,
    pub batch_size: usize,
    pub epochs: usize,
    pub lr: f64,
    pub legacy_cap_overflow: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            videos_dir: "videos".to_string(),
            output_dir: "output".to_string(),
            nclass: 101,
            depth: 10,
            color: false,
            skip: true,
            frame_size: 32,
            batch_size: 128,
            epochs: 100,
            lr: 1e-3,
            legacy_cap_overflow: false,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end.
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Validate directories ──────────────────────────────────────
        anyhow::ensure!(
            Path::new(&cfg.videos_dir).is_dir(),
            "videos directory '{}' does not exist",
            cfg.videos_dir
        );
        std::fs::create_dir_all(&cfg.output_dir)
            .with_context(|| format!("cannot create output directory '{}'", cfg.output_dir))?;

        // ── Step 2: Load or build the dataset ─────────────────────────────────
        // The cache key covers everything that changes the arrays;
        // a hit skips sampling (and the manifest rewrite) entirely.
        let cache = DatasetCache::new(cfg.output_dir.as_str());
        let key = CacheKey {
            max_classes: cfg.nclass,
            depth: cfg.depth,
            skip: cfg.skip,
        };

        let dataset = cache.load_or_build(&key, || {
            tracing::info!("Building dataset from '{}'", cfg.videos_dir);
            let sampler = FrameSampler::new(cfg.frame_size, cfg.frame_size, cfg.depth);
            let builder = DatasetBuilder::new(
                &sampler,
                ClassLabeler::default(),
                BuildOptions {
                    max_classes: cfg.nclass,
                    color: cfg.color,
                    skip: cfg.skip,
                    legacy_cap_overflow: cfg.legacy_cap_overflow,
                },
            );
            let built = builder.build(Path::new(&cfg.videos_dir))?;
            if built.skipped > 0 {
                tracing::warn!("{} videos were skipped during the build", built.skipped);
            }
            ManifestStore::new(cfg.output_dir.as_str()).save(&built.class_names)?;
            Ok(built)
        })?;

        let num_classes = dataset.num_classes();
        tracing::info!(
            "X_shape: {:?}  Y_shape: {:?}",
            dataset.features.shape(),
            dataset.labels.shape()
        );

        // ── Step 3: Train / validation split (80/20) ──────────────────────────
        let samples = samples_from_arrays(&dataset.features, &dataset.labels);
        let (train_samples, val_samples) = split_train_val(samples, 0.8);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );

        // ── Step 4: Build Burn datasets ───────────────────────────────────────
        let train_dataset = ClipDataset::new(train_samples);
        let val_dataset = ClipDataset::new(val_samples);

        // ── Step 5: Save config for inference ─────────────────────────────────
        let ckpt_manager = CheckpointManager::new(cfg.output_dir.as_str());
        ckpt_manager.save_config(cfg)?;

        // ── Step 6: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, num_classes, train_dataset, val_dataset, ckpt_manager)?;

        Ok(())
    }
}
