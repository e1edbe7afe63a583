// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Traits are Rust's way of defining shared behaviour —
// the seams where one implementation can stand in for another.
//
// By programming against traits instead of concrete types,
// the dataset builder never needs to know how frames are
// decoded. For example:
//   - FrameSampler implements ClipSource over a real video file
//   - Tests implement ClipSource with canned tensors and
//     scripted failures, no video fixtures required

use std::path::Path;

use crate::domain::clip::{ClipTensor, SampleError};

// ─── ClipSource ───────────────────────────────────────────────────────────────
/// Any component that can turn a video file into a ClipTensor.
///
/// Implementations:
///   - FrameSampler → decodes real videos via OpenCV
///   - test stubs   → return fixed tensors or scripted failures
pub trait ClipSource {
    /// Sample one clip from the video at `path`.
    ///
    /// `color` keeps 3-channel frames; otherwise frames are
    /// converted to grayscale. `skip` selects proportionally
    /// spaced frames across the whole clip; otherwise the first
    /// `depth` frames are taken.
    ///
    /// Any failure is a clip-level failure: no partial tensor is
    /// ever returned.
    fn sample(&self, path: &Path, color: bool, skip: bool) -> Result<ClipTensor, SampleError>;
}
