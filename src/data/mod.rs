// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from raw video files all the
// way to GPU-ready tensor batches.
//
// The pipeline flows in this order:
//
//   video files
//       │
//       ▼
//   FrameSampler      → decodes, resizes, stacks frames per clip
//       │
//       ▼
//   ClassLabeler      → derives the class name from the file name
//       │
//       ▼
//   DatasetBuilder    → walks folders, admits labels, stacks and
//       │               reorders axes into [N, H, W, depth, C]
//       ▼
//   DatasetCache      → persists/restores the finished arrays
//       │
//       ▼
//   ClipDataset       → implements Burn's Dataset trait
//       │
//       ▼
//   ClipBatcher       → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.

/// Decodes fixed-size clips from video files via OpenCV
pub mod sampler;

/// Derives class names from file names
pub mod labeler;

/// Walks the video tree and assembles the dataset arrays
pub mod builder;

/// Persists and restores built datasets as .npz archives
pub mod cache;

/// Implements Burn's Dataset trait over clip samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
