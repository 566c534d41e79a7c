//! Common file system operations with unified error handling

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{self, Result};

/// Read a UTF-8 file, mapping a missing file to `FileNotFound`
pub fn read_to_string(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(error::file_not_found(path));
    }
    fs::read_to_string(path).map_err(|e| error::file_read_failed(path, e))
}

/// Write `contents` to `path` atomically
///
/// The data goes to a temporary file next to the target which is then
/// renamed over it, so readers never observe a half-written artifact.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| error::file_write_failed(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| error::file_write_failed(path, e))?;
    tmp.write_all(contents)
        .map_err(|e| error::file_write_failed(path, e))?;
    tmp.persist(path)
        .map_err(|e| error::file_write_failed(path, e.error))?;
    Ok(())
}

/// Copy a single file, creating the destination's parent directories
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64> {
    if !src.is_file() {
        return Err(error::file_not_found(src));
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| error::file_write_failed(parent, e))?;
    }
    fs::copy(src, dst).map_err(|e| error::file_write_failed(dst, e))
}

/// Remove a directory tree; a missing directory is not an error
///
/// Returns whether anything was removed.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(path).map_err(|e| error::file_write_failed(path, e))?;
    Ok(true)
}

/// Render a path with forward slashes for platform-independent matching
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
