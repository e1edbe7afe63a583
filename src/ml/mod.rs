// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — only this one and
// the two data-layer adapters (dataset, batcher) that implement
// Burn's traits.
//
// What's in this layer:
//
//   model.rs      — The 3D-convolutional classifier
//                   Four Conv3d blocks (stride-2 stages downsample
//                   depth and space), dropout, and a two-layer
//                   dense head producing one logit per class
//
//   trainer.rs    — The training loop
//                   Forward pass, cross-entropy loss, backward
//                   pass, Adam step, validation pass per epoch,
//                   CSV metrics, best-accuracy checkpointing
//
//   inferencer.rs — The inference engine
//                   Loads a checkpoint, runs one clip through the
//                   model, softmaxes the logits into a prediction

/// 3D-convolutional action classifier architecture
pub mod model;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads a checkpoint and classifies clips
pub mod inferencer;
