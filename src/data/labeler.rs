// ============================================================
// Layer 4 — Class Labeler
// ============================================================
// Derives a class name from a video's file name.
//
// The naming convention: the class name is the substring between
// the first and second occurrence of the delimiter character.
//
//   walk_01_person.mp4
//       ^  ^
//       |  second delimiter (position 7)
//       first delimiter (position 4)
//   → class name "01"
//
// The delimiter is explicit configuration rather than a hardcoded
// '_' so datasets with a different convention can be labeled
// without touching this code. File names with fewer than two
// delimiters have no extractable class name and produce an
// explicit LabelError — the builder skips those files with a
// warning.

use crate::domain::label::LabelError;

/// Extracts class names from file names by delimiter position.
#[derive(Debug, Clone)]
pub struct ClassLabeler {
    delimiter: char,
}

impl ClassLabeler {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    /// Derive the class name for one file name.
    ///
    /// Pure function: same name in, same label out. The derived
    /// label is emitted at debug level for traceability only.
    pub fn label(&self, file_name: &str) -> Result<String, LabelError> {
        let malformed = || LabelError::Malformed {
            name: file_name.to_string(),
            delimiter: self.delimiter,
        };

        let first = file_name.find(self.delimiter).ok_or_else(malformed)?;
        let rest = &file_name[first + self.delimiter.len_utf8()..];
        let second = rest.find(self.delimiter).ok_or_else(malformed)?;

        let label = rest[..second].to_string();
        tracing::debug!("'{}' → class '{}'", file_name, label);
        Ok(label)
    }
}

impl Default for ClassLabeler {
    fn default() -> Self {
        Self::new('_')
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_between_first_two_underscores() {
        let labeler = ClassLabeler::default();
        assert_eq!(labeler.label("walk_01_person.mp4").unwrap(), "01");
        assert_eq!(labeler.label("v_ApplyEyeMakeup_g01_c01.avi").unwrap(), "ApplyEyeMakeup");
    }

    #[test]
    fn test_extra_delimiters_are_ignored() {
        // Only the first two delimiters matter
        let labeler = ClassLabeler::default();
        assert_eq!(labeler.label("a_b_c_d_e.mp4").unwrap(), "b");
    }

    #[test]
    fn test_single_delimiter_is_malformed() {
        let labeler = ClassLabeler::default();
        assert!(labeler.label("run_person.mp4").is_err());
    }

    #[test]
    fn test_no_delimiter_is_malformed() {
        let labeler = ClassLabeler::default();
        let err = labeler.label("plain.mp4").unwrap_err();
        assert!(err.to_string().contains("plain.mp4"));
    }

    #[test]
    fn test_adjacent_delimiters_yield_empty_label() {
        // Degenerate but well-formed: two delimiters with nothing
        // between them produce the empty class name.
        let labeler = ClassLabeler::default();
        assert_eq!(labeler.label("a__b.mp4").unwrap(), "");
    }

    #[test]
    fn test_custom_delimiter() {
        let labeler = ClassLabeler::new('-');
        assert_eq!(labeler.label("clip-wave-07.mp4").unwrap(), "wave");
    }
}
