//! Writes generated files to disk.

use crate::model::GeneratedFile;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Writes string content to a file.
///
/// Creates the file if it doesn't exist, or overwrites it if it does. Parent directories
/// are created as needed.
///
/// # Errors
///
/// Returns an error if the directory or the file cannot be created or written to.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Writes a generated file to its target path.
pub fn write_generated(file: &GeneratedFile) -> Result<()> {
    write_to_file(&file.contents, &file.path)
}
