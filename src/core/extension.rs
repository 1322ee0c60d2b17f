//! Claimed-extension extraction from file paths

use std::path::Path;

use super::error::ExtensionError;

/// Extract the extension a file name claims
///
/// Returns everything after the last `.` of the final path component.
/// A trailing `.` yields an empty extension. A name without any `.`, or a
/// dotfile whose only `.` is the leading one (`.bashrc`), has no extension.
///
/// # Arguments
/// * `path` - Path to the file, absolute or relative
///
/// # Returns
/// The claimed extension, compared later exactly as written
pub fn extract_extension(path: &Path) -> Result<String, ExtensionError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .ok_or(ExtensionError::NoExtension)?;

    match name.rfind('.') {
        Some(0) | None => Err(ExtensionError::NoExtension),
        Some(idx) => Ok(name[idx + 1..].to_string()),
    }
}
