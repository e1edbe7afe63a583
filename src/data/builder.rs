// ============================================================
// Layer 4 — Dataset Builder
// ============================================================
// Walks a directory tree of per-class video folders and turns it
// into one feature tensor and one label vector.
//
// Input layout on disk:
//
//   videos/
//     walking/
//       clip_walk_001.mp4
//       clip_walk_002.mp4
//     running/
//       clip_run_001.mp4
//
// The folder level is only an enumeration mechanism — the class
// of each video comes from its own file name via ClassLabeler.
//
// Per video: derive the label, sample the clip, then offer the
// label to the manifest. A clip that fails to sample is skipped
// (logged, counted, never fatal). A clip whose new label is
// rejected by the full manifest is dropped entirely, keeping
// feature and label counts equal; `legacy_cap_overflow` restores
// the historical behavior of appending the features anyway.
//
// After traversal the clips are stacked into [N, depth, H, W, C]
// and the temporal axis is moved behind the spatial axes, giving
// the [N, H, W, depth, C] layout the model consumes.
//
// Accumulation is local to one build call — the clip list, label
// list, and manifest are explicit fields of a single pass, and
// they are mutated strictly sequentially.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ndarray::{Array5, Axis};

use crate::data::labeler::ClassLabeler;
use crate::domain::clip::ClipTensor;
use crate::domain::label::{Admission, ClassManifest};
use crate::domain::traits::ClipSource;

/// macOS Finder drops these into shared folders; never a video.
const METADATA_MARKER: &str = ".DS_Store";

/// Knobs for one dataset build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Maximum number of distinct classes to admit.
    pub max_classes: usize,
    /// Keep 3-channel frames instead of converting to grayscale.
    pub color: bool,
    /// Sample proportionally spaced frames instead of the first N.
    pub skip: bool,
    /// Reproduce the historical cap behavior: when a new label is
    /// rejected by the full manifest, append the clip's features
    /// anyway and drop only the label. Leaves feature and label
    /// counts unequal; off by default.
    pub legacy_cap_overflow: bool,
}

/// The assembled dataset, before one-hot encoding and f32 casting.
#[derive(Debug)]
pub struct BuiltDataset {
    /// `[N, height, width, depth, channels]`, raw pixel bytes.
    pub features: Array5<u8>,
    /// Integer class ids, one per clip, indices into `class_names`.
    pub labels: Vec<usize>,
    /// The class manifest in admission order.
    pub class_names: Vec<String>,
    /// Videos dropped for sampling failures, malformed names, or
    /// cap rejection.
    pub skipped: usize,
}

/// One-pass dataset assembly over a directory tree.
pub struct DatasetBuilder<'a, S: ClipSource> {
    sampler: &'a S,
    labeler: ClassLabeler,
    options: BuildOptions,
}

impl<'a, S: ClipSource> DatasetBuilder<'a, S> {
    pub fn new(sampler: &'a S, labeler: ClassLabeler, options: BuildOptions) -> Self {
        Self {
            sampler,
            labeler,
            options,
        }
    }

    /// Build the dataset from every video under `root`.
    pub fn build(&self, root: &Path) -> Result<BuiltDataset> {
        let mut clips = Vec::new();
        let mut labels: Vec<String> = Vec::new();
        let mut manifest = ClassManifest::new(self.options.max_classes);
        let mut skipped = 0usize;

        let folders = sorted_entries(root)
            .with_context(|| format!("cannot read videos directory '{}'", root.display()))?;
        let folder_count = folders.len();

        for (done, folder) in folders.into_iter().enumerate() {
            let name = file_name_of(&folder);
            if name == METADATA_MARKER {
                continue;
            }
            if !folder.is_dir() {
                tracing::debug!("Ignoring non-directory entry '{}'", folder.display());
                continue;
            }

            tracing::info!("Scanning '{}' ({}/{})", name, done + 1, folder_count);

            let videos = sorted_entries(&folder)
                .with_context(|| format!("cannot read class folder '{}'", folder.display()))?;

            for video in videos {
                match self.collect_one(&video, &mut manifest) {
                    Some((clip, label)) => {
                        clips.push(clip);
                        if let Some(label) = label {
                            labels.push(label);
                        }
                    }
                    None => skipped += 1,
                }
            }
        }

        anyhow::ensure!(
            !clips.is_empty(),
            "no usable clips found under '{}'",
            root.display()
        );

        // Remap label strings to their manifest indices
        let label_ids = labels
            .iter()
            .map(|label| {
                manifest
                    .index_of(label)
                    .with_context(|| format!("label '{label}' missing from manifest"))
            })
            .collect::<Result<Vec<usize>>>()?;

        // Stack to [N, depth, H, W, C], then move the temporal axis
        // behind the spatial axes: [N, H, W, depth, C]
        let views: Vec<_> = clips.iter().map(|c| c.frames().view()).collect();
        let stacked = ndarray::stack(Axis(0), &views)
            .context("clips have mismatched shapes and cannot be stacked")?;
        let features = stacked
            .permuted_axes([0, 2, 3, 1, 4])
            .as_standard_layout()
            .to_owned();

        tracing::info!(
            "Assembled {} clips across {} classes ({} skipped), features shape {:?}",
            label_ids.len(),
            manifest.len(),
            skipped,
            features.shape(),
        );

        Ok(BuiltDataset {
            features,
            labels: label_ids,
            class_names: manifest.into_labels(),
            skipped,
        })
    }

    /// Label and sample one video. Returns None when the video is
    /// skipped; otherwise the clip plus the label to record (the
    /// label is None only in legacy overflow mode).
    fn collect_one(
        &self,
        video: &Path,
        manifest: &mut ClassManifest,
    ) -> Option<(ClipTensor, Option<String>)> {
        let file_name = file_name_of(video);

        let label = match self.labeler.label(&file_name) {
            Ok(label) => label,
            Err(e) => {
                tracing::warn!("Skipping '{}': {}", video.display(), e);
                return None;
            }
        };

        let clip = match self
            .sampler
            .sample(video, self.options.color, self.options.skip)
        {
            Ok(clip) => clip,
            Err(e) => {
                tracing::warn!("Skipping '{}': {}", video.display(), e);
                return None;
            }
        };

        // Admission happens only after a successful sample so a
        // failed clip can never reserve a manifest slot.
        match manifest.admit(&label) {
            Admission::Admitted(_) | Admission::AlreadyPresent(_) => Some((clip, Some(label))),
            Admission::Rejected if self.options.legacy_cap_overflow => {
                tracing::warn!(
                    "Class cap reached; keeping features of '{}' without a label (legacy mode)",
                    video.display()
                );
                Some((clip, None))
            }
            Admission::Rejected => {
                tracing::warn!(
                    "Skipping '{}': class '{}' is beyond the {}-class cap",
                    video.display(),
                    label,
                    manifest.len()
                );
                None
            }
        }
    }
}

/// Directory entries sorted by name. `read_dir` order is
/// platform-dependent; sorting keeps rebuilds deterministic.
fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .collect();
    entries.sort();
    Ok(entries)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
// The builder is driven with a stub ClipSource over a temp
// directory tree, so every traversal and admission rule is
// testable without decoding a single real video.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clip::{ClipTensor, SampleError};
    use ndarray::Array4;
    use std::fs::File;

    const DEPTH: usize = 4;
    const SIZE: usize = 8;

    /// Returns a clip filled with the file name's length (so
    /// different files yield different pixels), and fails on
    /// files whose name contains "bad".
    struct StubSampler;

    impl ClipSource for StubSampler {
        fn sample(&self, path: &Path, color: bool, _skip: bool) -> Result<ClipTensor, SampleError> {
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            if name.contains("bad") {
                return Err(SampleError::EmptyFrame { index: 2 });
            }
            let channels = if color { 3 } else { 1 };
            let fill = name.len() as u8;
            Ok(ClipTensor::new(Array4::from_elem(
                (DEPTH, SIZE, SIZE, channels),
                fill,
            )))
        }
    }

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    /// videos/<folder>/<files...>
    fn tree(layout: &[(&str, &[&str])]) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        for (folder, files) in layout {
            let dir = tmp.path().join(folder);
            fs::create_dir(&dir).unwrap();
            for file in *files {
                touch(&dir, file);
            }
        }
        tmp
    }

    fn options(max_classes: usize) -> BuildOptions {
        BuildOptions {
            max_classes,
            color: false,
            skip: true,
            legacy_cap_overflow: false,
        }
    }

    fn build(root: &Path, opts: BuildOptions) -> BuiltDataset {
        DatasetBuilder::new(&StubSampler, ClassLabeler::default(), opts)
            .build(root)
            .unwrap()
    }

    #[test]
    fn test_labels_come_from_file_names_not_folders() {
        let tmp = tree(&[("anything", &["x_walk_1.mp4", "x_run_1.mp4", "x_walk_2.mp4"])]);
        let ds = build(tmp.path(), options(10));

        // Traversal is name-sorted, so "x_run_1" is seen first
        assert_eq!(ds.class_names, vec!["run".to_string(), "walk".to_string()]);
        assert_eq!(ds.labels, vec![0, 1, 1]);
        assert_eq!(ds.skipped, 0);
    }

    #[test]
    fn test_failed_clips_are_skipped_not_fatal() {
        let tmp = tree(&[("a", &["x_walk_1.mp4", "x_walk_bad.mp4", "x_run_1.mp4"])]);
        let ds = build(tmp.path(), options(10));

        assert_eq!(ds.labels.len(), 2);
        assert_eq!(ds.features.shape()[0], 2);
        assert_eq!(ds.skipped, 1);
    }

    #[test]
    fn test_malformed_file_names_are_skipped() {
        let tmp = tree(&[("a", &["x_walk_1.mp4", "nodelimiters.mp4"])]);
        let ds = build(tmp.path(), options(10));

        assert_eq!(ds.labels.len(), 1);
        assert_eq!(ds.skipped, 1);
    }

    #[test]
    fn test_class_cap_drops_whole_clips_by_default() {
        let tmp = tree(&[(
            "a",
            &["x_walk_1.mp4", "x_run_1.mp4", "x_jump_1.mp4", "x_walk_2.mp4"],
        )]);
        let ds = build(tmp.path(), options(2));

        // "jump" arrives after the cap: sorted order is jump, run,
        // walk_1, walk_2 → jump and run admitted, walk rejected.
        assert_eq!(ds.class_names.len(), 2);
        assert_eq!(ds.features.shape()[0], ds.labels.len());
        assert_eq!(ds.skipped, 2);
    }

    #[test]
    fn test_legacy_cap_overflow_keeps_features_without_labels() {
        let tmp = tree(&[(
            "a",
            &["x_walk_1.mp4", "x_run_1.mp4", "x_jump_1.mp4", "x_walk_2.mp4"],
        )]);
        let mut opts = options(2);
        opts.legacy_cap_overflow = true;
        let ds = build(tmp.path(), opts);

        // The rejected clips' features are appended anyway — the
        // historical divergence between the two lengths.
        assert_eq!(ds.features.shape()[0], 4);
        assert_eq!(ds.labels.len(), 2);
    }

    #[test]
    fn test_metadata_marker_is_ignored() {
        let tmp = tree(&[("a", &["x_walk_1.mp4"])]);
        touch(tmp.path(), ".DS_Store");
        let ds = build(tmp.path(), options(10));
        assert_eq!(ds.labels.len(), 1);
    }

    #[test]
    fn test_empty_tree_is_an_error() {
        let tmp = tree(&[("a", &[])]);
        let result = DatasetBuilder::new(&StubSampler, ClassLabeler::default(), options(10))
            .build(tmp.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let result = DatasetBuilder::new(&StubSampler, ClassLabeler::default(), options(10))
            .build(Path::new("/definitely/not/here"));
        assert!(result.is_err());
    }

    #[test]
    fn test_gray_axis_order_is_n_h_w_depth_1() {
        let tmp = tree(&[("a", &["x_walk_1.mp4"])]);
        let ds = build(tmp.path(), options(10));
        assert_eq!(ds.features.shape(), &[1, SIZE, SIZE, DEPTH, 1]);
    }

    #[test]
    fn test_color_axis_order_is_n_h_w_depth_3() {
        let tmp = tree(&[("a", &["x_walk_1.mp4", "x_run_1.mp4"])]);
        let mut opts = options(10);
        opts.color = true;
        let ds = build(tmp.path(), opts);
        assert_eq!(ds.features.shape(), &[2, SIZE, SIZE, DEPTH, 3]);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let tmp = tree(&[
            ("b", &["x_run_1.mp4", "x_walk_9.mp4"]),
            ("a", &["x_walk_1.mp4", "x_jumpingjack_2.mp4"]),
        ]);
        let first = build(tmp.path(), options(10));
        let second = build(tmp.path(), options(10));

        assert_eq!(first.class_names, second.class_names);
        assert_eq!(first.labels, second.labels);
        assert_eq!(first.features, second.features);
    }
}
