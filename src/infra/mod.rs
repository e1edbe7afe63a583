// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles cross-cutting concerns that don't belong in any
// specific business layer:
//
//   checkpoint.rs — Saving and loading model weights
//                   Uses Burn's CompactRecorder to serialise
//                   model parameters to disk, plus the
//                   best-checkpoint pointer and the TrainConfig
//                   JSON that inference rebuilds the model from.
//
//   manifest.rs   — Class manifest persistence
//                   Writes classes.txt (one class name per line,
//                   in admission order) at build time and reloads
//                   it for prediction, so the same class ↔ index
//                   mapping is used in both directions.
//
//   metrics.rs    — Training metrics logging
//                   Writes epoch-level metrics (loss, accuracy,
//                   val_loss, val_accuracy) to a CSV file for
//                   later analysis and plotting.

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Class manifest writing and loading
pub mod manifest;

/// Training metrics CSV logger
pub mod metrics;
