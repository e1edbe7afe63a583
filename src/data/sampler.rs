// ============================================================
// Layer 4 — Frame Sampler
// ============================================================
// Turns one video file into a fixed-size ClipTensor using the
// opencv crate (videoio::VideoCapture).
//
// How sampling works:
//   1. Open the container and read its reported frame count
//   2. Compute `depth` sample positions:
//        skip=true  → i * total / depth  (proportionally spaced
//                     across the whole clip, so clips of any
//                     length yield the same number of frames)
//        skip=false → 0, 1, …, depth-1   (the first raw frames)
//   3. For each position: seek, decode one frame, resize to the
//      fixed square size, optionally convert BGR → grayscale
//   4. Stack the frames into [depth, height, width, channels]
//
// Failure policy: one bad frame kills the whole clip. A partial
// tensor is never returned — the caller either gets all `depth`
// frames or a SampleError.
//
// Resize happens before grayscale conversion; the order affects
// how chroma is resampled at boundary pixels.
//
// The capture handle is released on every exit path: decoding
// runs in a helper so the explicit release below it is reached on
// success and failure alike, and VideoCapture's Drop impl covers
// unwinding.

use std::path::Path;

use ndarray::Array3;
use opencv::{core, imgproc, prelude::*, videoio};

use crate::domain::clip::{ClipTensor, SampleError};
use crate::domain::traits::ClipSource;

/// Samples fixed-size clips from video files.
///
/// Width, height, and depth are fixed at construction; `color`
/// and `skip` vary per call, mirroring how the dataset builder
/// drives it.
pub struct FrameSampler {
    width: usize,
    height: usize,
    depth: usize,
}

impl FrameSampler {
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Compute the `depth` frame positions to sample.
    ///
    /// Positions are kept as f64 because seeking takes a
    /// floating-point property value; the backend rounds.
    ///
    /// A reported total of zero under skip-sampling would make
    /// every position 0.0 — that degenerate clip is rejected up
    /// front instead.
    pub fn sample_positions(
        total_frames: f64,
        depth: usize,
        skip: bool,
    ) -> Result<Vec<f64>, SampleError> {
        if skip {
            if total_frames <= 0.0 {
                return Err(SampleError::ZeroFrameCount);
            }
            Ok((0..depth)
                .map(|i| i as f64 * total_frames / depth as f64)
                .collect())
        } else {
            Ok((0..depth).map(|i| i as f64).collect())
        }
    }

    /// Seek to each sample position and decode, resize, and
    /// convert one frame per position.
    fn decode_clip(
        &self,
        cap: &mut videoio::VideoCapture,
        color: bool,
        skip: bool,
    ) -> Result<ClipTensor, SampleError> {
        let total_frames = cap
            .get(videoio::CAP_PROP_FRAME_COUNT)
            .map_err(|e| decode_error(0, e))?;
        let positions = Self::sample_positions(total_frames, self.depth, skip)?;

        let mut frames: Vec<Array3<u8>> = Vec::with_capacity(self.depth);
        for (index, &position) in positions.iter().enumerate() {
            let seeked = cap
                .set(videoio::CAP_PROP_POS_FRAMES, position)
                .map_err(|e| decode_error(index, e))?;
            if !seeked {
                return Err(SampleError::Decode {
                    index,
                    message: format!("seek to frame position {position} rejected"),
                });
            }

            let mut frame = core::Mat::default();
            let grabbed = cap.read(&mut frame).map_err(|e| decode_error(index, e))?;
            if !grabbed || frame.rows() == 0 || frame.cols() == 0 {
                return Err(SampleError::EmptyFrame { index });
            }

            frames.push(self.shrink(&frame, color).map_err(|message| {
                SampleError::Decode { index, message }
            })?);
        }

        let views: Vec<_> = frames.iter().map(|f| f.view()).collect();
        let stacked = ndarray::stack(ndarray::Axis(0), &views).map_err(|e| {
            SampleError::Decode {
                index: 0,
                message: format!("cannot stack frames: {e}"),
            }
        })?;
        Ok(ClipTensor::new(stacked))
    }

    /// Resize a decoded frame to the fixed square size and convert
    /// to grayscale when `color` is false. Returns the frame as
    /// `[height, width, channels]` bytes (BGR order for color, as
    /// decoded).
    fn shrink(&self, frame: &core::Mat, color: bool) -> Result<Array3<u8>, String> {
        let mut resized = core::Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            core::Size::new(self.width as i32, self.height as i32),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )
        .map_err(|e| e.to_string())?;

        let mat = if color {
            resized
        } else {
            let mut gray = core::Mat::default();
            imgproc::cvt_color(&resized, &mut gray, imgproc::COLOR_BGR2GRAY, 0)
                .map_err(|e| e.to_string())?;
            gray
        };

        let channels = mat.channels() as usize;
        let expected = if color { 3 } else { 1 };
        if channels != expected {
            return Err(format!(
                "expected {expected} channels after conversion, found {channels}"
            ));
        }

        // data_bytes needs one contiguous buffer
        let mat = if mat.is_continuous() {
            mat
        } else {
            mat.try_clone().map_err(|e| e.to_string())?
        };
        let bytes = mat.data_bytes().map_err(|e| e.to_string())?;
        Array3::from_shape_vec((self.height, self.width, channels), bytes.to_vec())
            .map_err(|e| e.to_string())
    }
}

impl ClipSource for FrameSampler {
    fn sample(&self, path: &Path, color: bool, skip: bool) -> Result<ClipTensor, SampleError> {
        let path_str = path.to_string_lossy();
        let mut cap = videoio::VideoCapture::from_file(path_str.as_ref(), videoio::CAP_ANY)
            .map_err(|e| SampleError::Open {
                path: path_str.to_string(),
                message: e.to_string(),
            })?;
        let opened = cap.is_opened().unwrap_or(false);
        if !opened {
            return Err(SampleError::Open {
                path: path_str.to_string(),
                message: "backend reports capture not opened".into(),
            });
        }

        let outcome = self.decode_clip(&mut cap, color, skip);
        // released on success and failure alike; Drop also releases
        let _ = cap.release();
        outcome
    }
}

fn decode_error(index: usize, e: opencv::Error) -> SampleError {
    SampleError::Decode {
        index,
        message: e.to_string(),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
// Position computation is pure, so the sampling policy is tested
// here without any video fixtures. Decode paths are exercised
// through the builder tests with a stub ClipSource.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_positions_are_proportionally_spaced() {
        let positions = FrameSampler::sample_positions(100.0, 10, true).unwrap();
        let expected: Vec<f64> = (0..10).map(|i| (i * 10) as f64).collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn test_skip_positions_are_monotone_and_span_the_clip() {
        let positions = FrameSampler::sample_positions(73.0, 10, true).unwrap();
        assert_eq!(positions.len(), 10);
        assert_eq!(positions[0], 0.0);
        for pair in positions.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        // All positions stay inside [0, total)
        assert!(positions.last().copied().unwrap() < 73.0);
    }

    #[test]
    fn test_non_skip_positions_ignore_clip_length() {
        let short = FrameSampler::sample_positions(5.0, 10, false).unwrap();
        let long = FrameSampler::sample_positions(5000.0, 10, false).unwrap();
        let expected: Vec<f64> = (0..10).map(|i| i as f64).collect();
        assert_eq!(short, expected);
        assert_eq!(long, expected);
    }

    #[test]
    fn test_zero_frame_count_fails_under_skip() {
        let result = FrameSampler::sample_positions(0.0, 10, true);
        assert!(matches!(result, Err(SampleError::ZeroFrameCount)));
    }

    #[test]
    fn test_zero_frame_count_allowed_without_skip() {
        // Without skip the reported total is never consulted; a
        // truly empty clip fails later at the first read instead.
        let positions = FrameSampler::sample_positions(0.0, 3, false).unwrap();
        assert_eq!(positions, vec![0.0, 1.0, 2.0]);
    }
}
