//! Discovery of plugin libraries in a directory.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

/// Returns `true` if `path` carries a dynamic-library extension.
#[must_use]
pub fn is_dynamic_library(path: &Path) -> bool {
    matches!(
        path.extension().and_then(OsStr::to_str),
        Some("so" | "dylib" | "dll")
    )
}

/// Lists the dynamic libraries directly inside `dir`, sorted by path.
///
/// Subdirectories are not searched.
///
/// # Errors
///
/// Returns the I/O error raised while reading the directory.
pub fn discover_libraries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut libraries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_dynamic_library(&path) {
            libraries.push(path);
        }
    }
    libraries.sort();
    Ok(libraries)
}
