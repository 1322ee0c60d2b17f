//! Per-file extension validation

use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::detector::ContentDetector;
use super::extension::extract_extension;
use super::reconciler::{reconcile, Classification};
use super::types::TypeTable;

/// Why a file could not be classified
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ErrorReason {
    /// Missing, unreadable, or not a regular file
    Unreadable(String),
    Empty,
    NoExtension,
    DetectionFailed(String),
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorReason::Unreadable(detail) => write!(f, "cannot open/read: {detail}"),
            ErrorReason::Empty => write!(f, "empty file"),
            ErrorReason::NoExtension => write!(f, "no extension"),
            ErrorReason::DetectionFailed(detail) => write!(f, "mime detection failed: {detail}"),
        }
    }
}

/// Result of validating a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Match {
        path: PathBuf,
        claimed_extension: String,
        detected_extension: String,
    },
    Mismatch {
        path: PathBuf,
        claimed_extension: String,
        detected_extension: String,
    },
    Unsupported {
        path: PathBuf,
        detected_mime: String,
    },
    Error {
        path: PathBuf,
        reason: ErrorReason,
    },
}

impl ValidationOutcome {
    pub fn path(&self) -> &Path {
        match self {
            ValidationOutcome::Match { path, .. }
            | ValidationOutcome::Mismatch { path, .. }
            | ValidationOutcome::Unsupported { path, .. }
            | ValidationOutcome::Error { path, .. } => path,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, ValidationOutcome::Match { .. })
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, ValidationOutcome::Mismatch { .. })
    }

    fn error(path: &Path, reason: ErrorReason) -> Self {
        ValidationOutcome::Error {
            path: path.to_path_buf(),
            reason,
        }
    }
}

/// Runs the validation steps for one file
///
/// Steps run in a fixed order: readability, emptiness, MIME detection,
/// extension extraction, classification. The first failing step decides the
/// outcome.
pub struct FileValidator<'t, D> {
    detector: D,
    table: &'t TypeTable,
}

impl<D: ContentDetector> FileValidator<'static, D> {
    /// Validator using the built-in type table
    pub fn new(detector: D) -> Self {
        Self::with_table(detector, TypeTable::builtin())
    }
}

impl<'t, D: ContentDetector> FileValidator<'t, D> {
    pub fn with_table(detector: D, table: &'t TypeTable) -> Self {
        Self { detector, table }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Validate a single file
    ///
    /// # Arguments
    /// * `path` - Path to the file
    ///
    /// # Returns
    /// The outcome for this file; per-file failures are outcomes, not errors
    pub fn validate(&self, path: &Path) -> ValidationOutcome {
        let size = match check_readable(path) {
            Ok(size) => size,
            Err(detail) => return ValidationOutcome::error(path, ErrorReason::Unreadable(detail)),
        };

        if size == 0 {
            return ValidationOutcome::error(path, ErrorReason::Empty);
        }

        let mime = match self.detector.detect_mime(path) {
            Ok(mime) => mime,
            Err(e) => {
                return ValidationOutcome::error(path, ErrorReason::DetectionFailed(e.to_string()))
            }
        };

        let claimed_extension = match extract_extension(path) {
            Ok(ext) => ext,
            Err(_) => return ValidationOutcome::error(path, ErrorReason::NoExtension),
        };

        match reconcile(self.table, &mime, &claimed_extension) {
            Classification::Match { detected_extension } => ValidationOutcome::Match {
                path: path.to_path_buf(),
                claimed_extension,
                detected_extension,
            },
            Classification::Mismatch { detected_extension } => ValidationOutcome::Mismatch {
                path: path.to_path_buf(),
                claimed_extension,
                detected_extension,
            },
            Classification::Unsupported => ValidationOutcome::Unsupported {
                path: path.to_path_buf(),
                detected_mime: mime,
            },
        }
    }
}

/// Open the file and return its size, or a description of why it can't be read
///
/// The file type is checked before opening: opening a FIFO would block
/// until a writer shows up.
fn check_readable(path: &Path) -> Result<u64, String> {
    let metadata = fs::metadata(path).map_err(|e| e.to_string())?;
    if metadata.is_dir() {
        return Err("is a directory".to_string());
    }
    if !metadata.is_file() {
        return Err("not a regular file".to_string());
    }
    File::open(path).map_err(|e| e.to_string())?;
    Ok(metadata.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DetectorError;
    use crate::core::types::SupportedType;
    use std::cell::Cell;
    use std::io::Write;
    use tempfile::TempDir;

    /// Detector returning a fixed answer and counting calls
    struct FixedDetector {
        answer: Option<&'static str>,
        calls: Cell<usize>,
    }

    impl FixedDetector {
        fn new(answer: Option<&'static str>) -> Self {
            Self {
                answer,
                calls: Cell::new(0),
            }
        }
    }

    impl ContentDetector for FixedDetector {
        fn detect_mime(&self, _path: &Path) -> Result<String, DetectorError> {
            self.calls.set(self.calls.get() + 1);
            self.answer
                .map(str::to_string)
                .ok_or(DetectorError::OutputMalformed {
                    output: "garbage".into(),
                })
        }
    }

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[test]
    fn test_match() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "photo.jpg", b"data");
        let validator = FileValidator::new(FixedDetector::new(Some("image/jpeg")));

        assert_eq!(
            validator.validate(&path),
            ValidationOutcome::Match {
                path: path.clone(),
                claimed_extension: "jpg".into(),
                detected_extension: "jpeg/jpg/jpe/jfif".into(),
            }
        );
    }

    #[test]
    fn test_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "b.pdf", b"data");
        let validator = FileValidator::new(FixedDetector::new(Some("image/png")));

        assert_eq!(
            validator.validate(&path),
            ValidationOutcome::Mismatch {
                path: path.clone(),
                claimed_extension: "pdf".into(),
                detected_extension: "png".into(),
            }
        );
    }

    #[test]
    fn test_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "blob.bin", b"\x00\x01");
        let validator = FileValidator::new(FixedDetector::new(Some("application/octet-stream")));

        assert_eq!(
            validator.validate(&path),
            ValidationOutcome::Unsupported {
                path: path.clone(),
                detected_mime: "application/octet-stream".into(),
            }
        );
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let validator = FileValidator::new(FixedDetector::new(Some("application/pdf")));

        let outcome = validator.validate(&dir.path().join("gone.pdf"));
        assert!(matches!(
            outcome,
            ValidationOutcome::Error {
                reason: ErrorReason::Unreadable(_),
                ..
            }
        ));
        assert_eq!(validator.detector().calls.get(), 0);
    }

    #[test]
    fn test_directory_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let validator = FileValidator::new(FixedDetector::new(Some("application/pdf")));

        let outcome = validator.validate(dir.path());
        assert_eq!(
            outcome,
            ValidationOutcome::Error {
                path: dir.path().to_path_buf(),
                reason: ErrorReason::Unreadable("is a directory".into()),
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_fifo_is_not_opened() {
        let dir = TempDir::new().unwrap();
        let fifo = dir.path().join("b.pipe");
        let status = std::process::Command::new("mkfifo").arg(&fifo).status().unwrap();
        assert!(status.success());
        let validator = FileValidator::new(FixedDetector::new(Some("application/pdf")));

        assert_eq!(
            validator.validate(&fifo),
            ValidationOutcome::Error {
                path: fifo.clone(),
                reason: ErrorReason::Unreadable("not a regular file".into()),
            }
        );
        assert_eq!(validator.detector().calls.get(), 0);
    }

    #[test]
    fn test_empty_file_skips_detector() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "c.txt", b"");
        let validator = FileValidator::new(FixedDetector::new(Some("text/plain")));

        assert_eq!(
            validator.validate(&path),
            ValidationOutcome::Error {
                path,
                reason: ErrorReason::Empty,
            }
        );
        assert_eq!(validator.detector().calls.get(), 0);
    }

    #[test]
    fn test_detector_failure() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "a.pdf", b"%PDF-1.4");
        let validator = FileValidator::new(FixedDetector::new(None));

        match validator.validate(&path) {
            ValidationOutcome::Error {
                reason: ErrorReason::DetectionFailed(detail),
                ..
            } => assert!(detail.contains("malformed")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_no_extension_after_detection() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "README", b"hello");
        let validator = FileValidator::new(FixedDetector::new(Some("text/plain")));

        assert_eq!(
            validator.validate(&path),
            ValidationOutcome::Error {
                path,
                reason: ErrorReason::NoExtension,
            }
        );
        assert_eq!(validator.detector().calls.get(), 1);
    }

    #[test]
    fn test_custom_table() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "notes.txt", b"hello");
        let table = TypeTable::new(1, vec![SupportedType::new("text/plain", &["txt"])]);
        let validator = FileValidator::with_table(FixedDetector::new(Some("text/plain")), &table);

        assert!(validator.validate(&path).is_match());
    }

    #[test]
    fn test_validation_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "b.pdf", b"data");
        let validator = FileValidator::new(FixedDetector::new(Some("image/png")));

        assert_eq!(validator.validate(&path), validator.validate(&path));
    }
}
