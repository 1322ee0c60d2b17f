//! Reconciliation of detected MIME types against claimed extensions

use super::types::TypeTable;

/// Result of comparing a detected MIME type with a claimed extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Claimed extension is one of the aliases for the detected type
    Match { detected_extension: String },
    /// Type is supported but the claimed extension is not among its aliases
    Mismatch { detected_extension: String },
    /// Detected type is not in the table
    Unsupported,
}

/// Classify a (detected MIME, claimed extension) pair
///
/// Both strings are compared exactly as given. The first table entry whose
/// MIME type equals `mime` decides the outcome.
pub fn reconcile(table: &TypeTable, mime: &str, claimed_extension: &str) -> Classification {
    match table.lookup(mime) {
        None => Classification::Unsupported,
        Some(entry) => {
            let detected_extension = entry.display_extensions();
            if entry.accepts(claimed_extension) {
                Classification::Match { detected_extension }
            } else {
                Classification::Mismatch { detected_extension }
            }
        }
    }
}
