// ============================================================
// Layer 3 — Clip Domain Types
// ============================================================
// A ClipTensor is the fixed-size spatio-temporal tensor sampled
// from one video file: `depth` frames, each resized to the same
// height × width, with 1 (grayscale) or 3 (BGR) channels.
//
// The tensor is stored as ndarray Array4<u8> with axis order
// [depth, height, width, channels]. Axis reordering for the
// model's expected layout happens later, in the dataset builder.
//
// A clip is all-or-nothing: if any frame of a video cannot be
// decoded, no ClipTensor is produced for it. SampleError is the
// taxonomy of everything that can go wrong while sampling one
// clip; every variant is recoverable at the dataset level (the
// clip is skipped and the build continues).

use ndarray::Array4;
use thiserror::Error;

/// Everything that can fail while sampling a single video clip.
///
/// None of these are fatal to a dataset build — the builder logs
/// the failure, drops the clip, and moves on.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The container could not be opened at all (missing file,
    /// unsupported format, backend failure).
    #[error("cannot open video '{path}': {message}")]
    Open { path: String, message: String },

    /// The container reports zero total frames, so proportional
    /// skip positions cannot be computed.
    #[error("video reports zero frames, cannot compute skip positions")]
    ZeroFrameCount,

    /// A seek+read at the given sample index produced no frame.
    #[error("empty or invalid frame at sample index {index}")]
    EmptyFrame { index: usize },

    /// Seeking, decoding, resizing, or color conversion failed at
    /// the given sample index.
    #[error("decode error at sample index {index}: {message}")]
    Decode { index: usize, message: String },
}

/// The sampled tensor for one clip: `[depth, height, width, channels]`.
///
/// Invariant: every frame shares the same spatial dimensions and
/// channel count — enforced by construction, since all frames pass
/// through the same resize/convert path before stacking.
#[derive(Debug, Clone)]
pub struct ClipTensor {
    frames: Array4<u8>,
}

impl ClipTensor {
    pub fn new(frames: Array4<u8>) -> Self {
        Self { frames }
    }

    /// The underlying `[depth, height, width, channels]` array.
    pub fn frames(&self) -> &Array4<u8> {
        &self.frames
    }

    /// Number of frames in the clip (the temporal axis).
    pub fn depth(&self) -> usize {
        self.frames.shape()[0]
    }

    pub fn height(&self) -> usize {
        self.frames.shape()[1]
    }

    pub fn width(&self) -> usize {
        self.frames.shape()[2]
    }

    /// 1 for grayscale, 3 for color.
    pub fn channels(&self) -> usize {
        self.frames.shape()[3]
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    #[test]
    fn test_clip_tensor_dimensions() {
        let clip = ClipTensor::new(Array4::<u8>::zeros((10, 32, 32, 1)));
        assert_eq!(clip.depth(), 10);
        assert_eq!(clip.height(), 32);
        assert_eq!(clip.width(), 32);
        assert_eq!(clip.channels(), 1);
    }

    #[test]
    fn test_sample_error_messages_name_the_index() {
        let err = SampleError::EmptyFrame { index: 5 };
        assert!(err.to_string().contains('5'));

        let err = SampleError::Decode {
            index: 3,
            message: "bad packet".into(),
        };
        assert!(err.to_string().contains('3'));
        assert!(err.to_string().contains("bad packet"));
    }
}
