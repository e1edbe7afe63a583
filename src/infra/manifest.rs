// ============================================================
// Layer 6 — Class Manifest Store
// ============================================================
// Persists the class manifest as plain text: one class name per
// line, in admission order, so line number = integer class id.
//
// The file is truncated and rewritten on every build — the
// manifest is immutable for a run once written. Prediction
// reloads it to translate the model's argmax index back into a
// class name.
//
// Output file: <output>/classes.txt

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: PathBuf::from(dir.into()),
        }
    }

    fn path(&self) -> PathBuf {
        self.dir.join("classes.txt")
    }

    /// Write the class names, one per line, replacing any
    /// previous manifest.
    pub fn save(&self, class_names: &[String]) -> Result<()> {
        fs::create_dir_all(&self.dir).ok();
        let path = self.path();

        let mut contents = String::new();
        for name in class_names {
            contents.push_str(name);
            contents.push('\n');
        }
        fs::write(&path, contents)
            .with_context(|| format!("Cannot write class manifest '{}'", path.display()))?;

        tracing::info!("Wrote {} classes to '{}'", class_names.len(), path.display());
        Ok(())
    }

    /// Read the class names back, preserving line order.
    pub fn load(&self) -> Result<Vec<String>> {
        let path = self.path();
        let contents = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read class manifest '{}'. Have you run 'train' first?",
                path.display()
            )
        })?;
        Ok(contents.lines().map(str::to_string).collect())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_order() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(tmp.path().to_string_lossy().to_string());

        let names = vec!["walk".to_string(), "run".to_string(), "jump".to_string()];
        store.save(&names).unwrap();
        assert_eq!(store.load().unwrap(), names);
    }

    #[test]
    fn test_save_truncates_previous_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(tmp.path().to_string_lossy().to_string());

        store.save(&["a".to_string(), "b".to_string()]).unwrap();
        store.save(&["c".to_string()]).unwrap();
        assert_eq!(store.load().unwrap(), vec!["c".to_string()]);
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(tmp.path().to_string_lossy().to_string());
        assert!(store.load().is_err());
    }
}
