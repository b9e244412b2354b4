//! Write output artifacts to disk.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::Path;

use crate::error::AppError;

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => create_dir_all(dir).map_err(|e| {
            AppError::Render(format!("Failed to create output directory '{}': {e}", dir.display()))
        }),
        _ => Ok(()),
    }
}

/// Write the rendered summary page.
pub fn write_html(path: &Path, html: &str) -> Result<(), AppError> {
    ensure_parent_dir(path)?;

    let mut file = File::create(path)
        .map_err(|e| AppError::Render(format!("Failed to create HTML '{}': {e}", path.display())))?;
    file.write_all(html.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| AppError::Render(format!("Failed to write HTML '{}': {e}", path.display())))?;

    Ok(())
}
