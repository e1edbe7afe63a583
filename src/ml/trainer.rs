// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader and Adam.
//
// Backend split:
//   - Training uses MyBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on MyInnerBackend (Wgpu)
//   - Validation batcher must also use MyInnerBackend
//   - argmax(1) returns [batch,1] so we flatten before .equal()
//
// Per epoch: average train loss/accuracy, then a dropout-free
// validation pass. Metrics go to the CSV history; weights are
// checkpointed only when validation accuracy improves.

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ClipBatcher, dataset::ClipDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{ActionCnnConfig, ActionCnnModel};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;
type MyInnerBackend = burn::backend::Wgpu;

pub fn run_training(
    cfg: &TrainConfig,
    num_classes: usize,
    train_dataset: ClipDataset,
    val_dataset: ClipDataset,
    ckpt_manager: CheckpointManager,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop(cfg, num_classes, train_dataset, val_dataset, ckpt_manager, device)
}

fn train_loop(
    cfg: &TrainConfig,
    num_classes: usize,
    train_dataset: ClipDataset,
    val_dataset: ClipDataset,
    ckpt_manager: CheckpointManager,
    device: burn::backend::wgpu::WgpuDevice,
) -> Result<()> {
    // ── Build model ───────────────────────────────────────────────────────────
    let channels = if cfg.color { 3 } else { 1 };
    let model_cfg = ActionCnnConfig::new(num_classes, cfg.frame_size, cfg.depth, channels);
    let mut model: ActionCnnModel<MyBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} classes, {}x{}x{} input, {} channels",
        num_classes, cfg.frame_size, cfg.frame_size, cfg.depth, channels,
    );

    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = ClipBatcher::<MyBackend>::new(device.clone());
    let train_loader = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(43)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_batcher = ClipBatcher::<MyInnerBackend>::new(device.clone());
    let val_loader = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let metrics = MetricsLogger::new(cfg.output_dir.as_str())?;
    let mut best_val_accuracy = f64::NEG_INFINITY;
    let mut last_val_loss = f64::NAN;
    let mut last_val_accuracy = 0.0f64;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches = 0usize;
        let mut train_correct = 0usize;
        let mut train_total = 0usize;

        for batch in train_loader.iter() {
            let (loss, logits) = model.forward_loss(batch.clips, batch.targets.clone());

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches += 1;

            let predictions = logits.argmax(1).flatten::<1>(0, 1);
            train_total += batch.targets.dims()[0];
            train_correct += predictions
                .equal(batch.targets)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>() as usize;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else {
            f64::NAN
        };
        let train_accuracy = if train_total > 0 {
            train_correct as f64 / train_total as f64
        } else {
            0.0
        };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → ActionCnnModel<MyInnerBackend>, dropout disabled
        let model_valid = model.valid();
        let (val_loss, val_accuracy) = evaluate(&model_valid, &*val_loader);
        last_val_loss = val_loss;
        last_val_accuracy = val_accuracy;

        println!(
            "Epoch {:>3}/{} | loss={:.4} | acc={:.1}% | val_loss={:.4} | val_acc={:.1}%",
            epoch,
            cfg.epochs,
            train_loss,
            train_accuracy * 100.0,
            val_loss,
            val_accuracy * 100.0,
        );

        metrics.log(&EpochMetrics {
            epoch,
            loss: train_loss,
            accuracy: train_accuracy,
            val_loss,
            val_accuracy,
        })?;

        // Best-only checkpointing, monitored on validation accuracy
        if val_accuracy > best_val_accuracy {
            best_val_accuracy = val_accuracy;
            ckpt_manager.save_model(&model, epoch, val_accuracy)?;
            tracing::info!(
                "Checkpoint saved: epoch {} val_acc={:.2}%",
                epoch,
                val_accuracy * 100.0
            );
        }
    }

    // ── Final evaluation ──────────────────────────────────────────────────────
    println!("Test loss: {last_val_loss:.4}");
    println!("Test accuracy: {:.2}%", last_val_accuracy * 100.0);
    tracing::info!("Training complete!");
    Ok(())
}

/// One full pass over a loader: (average loss, accuracy).
fn evaluate(
    model: &ActionCnnModel<MyInnerBackend>,
    loader: &dyn burn::data::dataloader::DataLoader<crate::data::batcher::ClipBatch<MyInnerBackend>>,
) -> (f64, f64) {
    let mut loss_sum = 0.0f64;
    let mut batches = 0usize;
    let mut correct = 0usize;
    let mut total = 0usize;

    for batch in loader.iter() {
        let logits = model.forward(batch.clips);

        let ce = burn::nn::loss::CrossEntropyLossConfig::new().init(&logits.device());
        let loss: f64 = ce
            .forward(logits.clone(), batch.targets.clone())
            .into_scalar()
            .elem::<f64>();
        loss_sum += loss;
        batches += 1;

        let predictions = logits.argmax(1).flatten::<1>(0, 1);
        total += batch.targets.dims()[0];
        correct += predictions
            .equal(batch.targets)
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>() as usize;
    }

    let loss = if batches > 0 {
        loss_sum / batches as f64
    } else {
        f64::NAN
    };
    let accuracy = if total > 0 {
        correct as f64 / total as f64
    } else {
        0.0
    };
    (loss, accuracy)
}
