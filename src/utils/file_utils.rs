//! File system utilities

use anyhow::{anyhow, Result};
use std::fs;
use std::path::Path;

use super::encoding::with_bom;

/// Ensure directory exists
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| anyhow!("Failed to create directory {}: {}", path.display(), e))?;
    }
    Ok(())
}

/// Get file extension
pub fn get_file_extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Write text as BOM-prefixed UTF-8, creating parent directories
pub fn write_utf8_with_bom(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, with_bom(content))
        .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))
}
