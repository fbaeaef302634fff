use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Write a playlist to a local path, creating parent directories.
///
/// Returns the absolute path written, for the run summary.
pub fn write_local(path: &str, text: &str) -> Result<PathBuf> {
    let path = Path::new(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;

    let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    tracing::info!(path = %resolved.display(), lines = text.lines().count(), "Wrote file");
    Ok(resolved)
}

/// Write any serializable value as pretty JSON.
pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_local(path, &json)?;
    Ok(())
}
