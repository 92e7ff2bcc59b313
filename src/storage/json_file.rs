use crate::model::OutputError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Writes `value` as pretty JSON, replacing `path` only once the whole
/// document is on disk. On failure the previous file is left as it was.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let body = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| OutputError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let staging = staging_path(path);
    if let Err(source) = fs::write(&staging, body) {
        discard(&staging);
        return Err(OutputError::Io { path: staging, source });
    }

    if let Err(source) = fs::rename(&staging, path) {
        discard(&staging);
        return Err(OutputError::Io { path: path.to_path_buf(), source });
    }

    info!("✅ {} written", path.display());
    Ok(())
}

fn discard(staging: &Path) {
    if let Err(e) = fs::remove_file(staging) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove {}: {}", staging.display(), e);
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
