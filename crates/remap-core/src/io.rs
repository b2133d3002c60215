use crate::error::{RemapError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// Import format detection
// ---------------------------------------------------------------------------

/// On-disk format of an imported document, detected by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Yaml,
    Json,
}

pub fn import_format(path: &Path) -> Result<ImportFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Ok(ImportFormat::Yaml),
        Some("json") => Ok(ImportFormat::Json),
        other => Err(RemapError::InvalidImport {
            path: path.display().to_string(),
            reason: format!(
                "unsupported extension '{}': expected .yaml, .yml, or .json",
                other.unwrap_or("")
            ),
        }),
    }
}

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting project documents.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}
