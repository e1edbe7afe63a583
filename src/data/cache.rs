// ============================================================
// Layer 4 — Dataset Cache
// ============================================================
// Sampling every video is by far the slowest part of a run, so
// the finished (features, labels) pair is persisted to a .npz
// archive and reused on the next run with the same configuration.
//
// The artifact name encodes everything that changes the tensor
// contents:
//
//   dataset_{max_classes}_{depth}_{skip}.npz
//
// Same configuration → same file name → cache hit; the builder is
// never invoked and the directory tree is not re-read. Changing
// any key component produces a different file name, so stale
// artifacts are simply never matched. There is no eviction —
// artifacts accumulate until the user deletes them.
//
// The archive holds two named arrays:
//   features — f32, [N, H, W, depth, C]
//   labels   — f32 one-hot, [N, num_classes]
//
// An artifact that exists but cannot be deserialized is a hard
// error, not a rebuild trigger — rebuilding over it would mask
// data corruption.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ndarray::{Array2, Array5};
use ndarray_npy::{NpzReader, NpzWriter};

use crate::data::builder::BuiltDataset;

/// The configuration triple that keys one cache artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKey {
    pub max_classes: usize,
    pub depth: usize,
    pub skip: bool,
}

impl CacheKey {
    /// Deterministic artifact name for this configuration.
    pub fn file_name(&self) -> String {
        format!(
            "dataset_{}_{}_{}.npz",
            self.max_classes, self.depth, self.skip
        )
    }
}

/// The training-ready pair: float features and one-hot labels.
#[derive(Debug)]
pub struct CachedDataset {
    pub features: Array5<f32>,
    pub labels: Array2<f32>,
}

impl CachedDataset {
    pub fn num_classes(&self) -> usize {
        self.labels.shape()[1]
    }
}

/// Loads a previously built dataset or builds and persists one.
pub struct DatasetCache {
    dir: PathBuf,
}

impl DatasetCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn artifact_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Return the cached dataset for `key`, or run `build`,
    /// encode and persist its output, and return that.
    pub fn load_or_build<F>(&self, key: &CacheKey, build: F) -> Result<CachedDataset>
    where
        F: FnOnce() -> Result<BuiltDataset>,
    {
        let path = self.artifact_path(key);
        if path.exists() {
            tracing::info!("Loading cached dataset '{}'", path.display());
            return self.load(&path);
        }

        let built = build()?;
        let num_classes = built.class_names.len();
        let features = built.features.mapv(|v| v as f32);
        let labels = one_hot(&built.labels, num_classes);

        self.save(&path, &features, &labels)?;
        tracing::info!("Saved dataset to '{}'", path.display());

        Ok(CachedDataset { features, labels })
    }

    fn load(&self, path: &Path) -> Result<CachedDataset> {
        let corrupt = || {
            format!(
                "cache artifact '{}' exists but cannot be read — \
                 refusing to rebuild over it; delete the file to force a rebuild",
                path.display()
            )
        };

        let file = File::open(path).with_context(corrupt)?;
        let mut npz = NpzReader::new(file).with_context(corrupt)?;
        let features: Array5<f32> = npz.by_name("features.npy").with_context(corrupt)?;
        let labels: Array2<f32> = npz.by_name("labels.npy").with_context(corrupt)?;

        Ok(CachedDataset { features, labels })
    }

    fn save(&self, path: &Path, features: &Array5<f32>, labels: &Array2<f32>) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("cannot create cache artifact '{}'", path.display()))?;
        let mut npz = NpzWriter::new(file);
        npz.add_array("features", features)
            .context("cannot write features array")?;
        npz.add_array("labels", labels)
            .context("cannot write labels array")?;
        npz.finish().context("cannot finish cache artifact")?;
        Ok(())
    }
}

/// One-hot encode integer class ids over `num_classes` columns.
pub fn one_hot(labels: &[usize], num_classes: usize) -> Array2<f32> {
    let mut encoded = Array2::<f32>::zeros((labels.len(), num_classes));
    for (row, &class) in labels.iter().enumerate() {
        if class < num_classes {
            encoded[[row, class]] = 1.0;
        }
    }
    encoded
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array5;
    use std::cell::Cell;

    fn built(n: usize) -> BuiltDataset {
        let mut features = Array5::<u8>::zeros((n, 4, 4, 2, 1));
        for (i, mut clip) in features.outer_iter_mut().enumerate() {
            clip.fill(i as u8 + 1);
        }
        BuiltDataset {
            features,
            labels: (0..n).map(|i| i % 2).collect(),
            class_names: vec!["walk".into(), "run".into()],
            skipped: 0,
        }
    }

    #[test]
    fn test_key_encodes_all_three_components() {
        let key = CacheKey {
            max_classes: 7,
            depth: 10,
            skip: true,
        };
        assert_eq!(key.file_name(), "dataset_7_10_true.npz");

        let other = CacheKey { skip: false, ..key };
        assert_ne!(key.file_name(), other.file_name());
    }

    #[test]
    fn test_build_then_hit_invokes_builder_once() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(tmp.path());
        let key = CacheKey {
            max_classes: 2,
            depth: 2,
            skip: true,
        };

        let calls = Cell::new(0usize);
        let run = |cache: &DatasetCache| {
            cache
                .load_or_build(&key, || {
                    calls.set(calls.get() + 1);
                    Ok(built(3))
                })
                .unwrap()
        };

        let first = run(&cache);
        let second = run(&cache);

        assert_eq!(calls.get(), 1);
        assert_eq!(first.features, second.features);
        assert_eq!(first.labels, second.labels);
    }

    #[test]
    fn test_round_trip_is_bit_identical() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(tmp.path());
        let key = CacheKey {
            max_classes: 2,
            depth: 2,
            skip: false,
        };

        let fresh = cache.load_or_build(&key, || Ok(built(5))).unwrap();
        let reloaded = cache
            .load_or_build(&key, || panic!("builder must not run on a hit"))
            .unwrap();

        assert_eq!(fresh.features, reloaded.features);
        assert_eq!(fresh.labels, reloaded.labels);
    }

    #[test]
    fn test_features_are_cast_to_f32() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(tmp.path());
        let key = CacheKey {
            max_classes: 2,
            depth: 2,
            skip: true,
        };

        let ds = cache.load_or_build(&key, || Ok(built(2))).unwrap();
        assert_eq!(ds.features.shape(), &[2, 4, 4, 2, 1]);
        assert_eq!(ds.features[[1, 0, 0, 0, 0]], 2.0);
        assert_eq!(ds.num_classes(), 2);
    }

    #[test]
    fn test_corrupt_artifact_is_fatal_not_rebuilt() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = DatasetCache::new(tmp.path());
        let key = CacheKey {
            max_classes: 2,
            depth: 2,
            skip: true,
        };

        std::fs::write(cache.artifact_path(&key), b"not an archive").unwrap();
        let result = cache.load_or_build(&key, || Ok(built(2)));
        assert!(result.is_err());
    }

    #[test]
    fn test_one_hot_rows() {
        let encoded = one_hot(&[0, 2, 1], 3);
        assert_eq!(encoded.shape(), &[3, 3]);
        assert_eq!(encoded[[0, 0]], 1.0);
        assert_eq!(encoded[[1, 2]], 1.0);
        assert_eq!(encoded[[2, 1]], 1.0);
        assert_eq!(encoded.sum(), 3.0);
    }
}
