// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `predict`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the clip dataset and train the action classifier
    Train(TrainArgs),

    /// Classify a single video using a trained checkpoint
    Predict(PredictArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory of per-class folders containing video files
    #[arg(long, default_value = "videos")]
    pub videos: String,

    /// Directory for the dataset cache, class manifest,
    /// checkpoints, and metrics
    #[arg(long)]
    pub output: String,

    /// Maximum number of action classes to admit
    #[arg(long, default_value_t = 101)]
    pub nclass: usize,

    /// Number of frames sampled per clip
    #[arg(long, default_value_t = 10)]
    pub depth: usize,

    /// Keep 3-channel color frames instead of grayscale
    #[arg(long)]
    pub color: bool,

    /// Sample frames proportionally across each clip's length
    /// instead of taking the first `depth` frames
    #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
    pub skip: bool,

    /// Number of clips processed together in one forward pass
    #[arg(long, default_value_t = 128)]
    pub batch: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 100)]
    pub epoch: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Reproduce the historical class-cap behavior: clips whose
    /// new label is rejected still contribute features (leaves
    /// feature and label counts unequal)
    #[arg(long)]
    pub legacy_cap_overflow: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            videos_dir: a.videos,
            output_dir: a.output,
            nclass: a.nclass,
            depth: a.depth,
            color: a.color,
            skip: a.skip,
            // frames are square and fixed-size; not a CLI knob
            frame_size: TrainConfig::default().frame_size,
            batch_size: a.batch,
            epochs: a.epoch,
            lr: a.lr,
            legacy_cap_overflow: a.legacy_cap_overflow,
        }
    }
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// The video file to classify
    #[arg(long)]
    pub video: String,

    /// Directory where `train` wrote its outputs
    #[arg(long)]
    pub output: String,
}
