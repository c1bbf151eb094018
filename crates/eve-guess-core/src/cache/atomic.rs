//! Atomic file operations for snapshot persistence.
//!
//! Writes go to a temp file with a PID suffix, are synced to disk, then
//! renamed over the target. Readers never see a truncated snapshot.

use crate::{GuessError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process;
use tracing::debug;

/// Read and parse a JSON file.
///
/// Returns `None` if the file doesn't exist. Unreadable or unparseable
/// contents are reported as [`GuessError::CacheCorruption`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(GuessError::CacheCorruption {
                path: path.to_path_buf(),
                message: format!("could not be read: {}", e),
            })
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| GuessError::CacheCorruption {
            path: path.to_path_buf(),
            message: format!("could not be parsed: {}", e),
        })
}

/// Serialize `data` as compact JSON and write it atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let serialized = serde_json::to_vec(data)?;
    write_bytes(path, &serialized)
}

/// Write raw bytes atomically, creating the parent directory if needed.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| GuessError::io_with_path(e, parent))?;
        }
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, process::id()));

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| GuessError::io_with_path(e, &temp_path))?;

        file.write_all(bytes)
            .map_err(|e| GuessError::io_with_path(e, &temp_path))?;
        file.sync_all()
            .map_err(|e| GuessError::io_with_path(e, &temp_path))?;
    }

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(GuessError::io_with_path(e, path));
    }

    debug!("Atomically wrote {}", path.display());
    Ok(())
}

/// Delete a file, treating "already gone" as success.
///
/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(GuessError::io_with_path(e, path)),
    }
}
