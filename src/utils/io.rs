//! File I/O primitives with consistent error handling.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Read file contents with standardized error handling.
///
/// Wraps `fs::read_to_string` with consistent `Error::internal_io` formatting.
pub fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("{} {}", operation, path.display())),
        )
    })
}

/// Write content to file with standardized error handling.
pub fn write_file(path: &Path, content: &str, operation: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("{} {}", operation, path.display())),
        )
    })
}

/// Rename a file or directory, refusing to replace an existing target.
///
/// `fs::rename` silently replaces files (and empty directories on Unix), so
/// the existence check runs first. The check and the rename are not atomic.
pub fn rename_no_clobber(from: &Path, to: &Path, operation: &str) -> Result<()> {
    if to.exists() {
        return Err(Error::internal_io(
            format!("Target already exists: {}", to.display()),
            Some(operation.to_string()),
        ));
    }

    fs::rename(from, to).map_err(|e| {
        Error::internal_io(
            e.to_string(),
            Some(format!("{} {} → {}", operation, from.display(), to.display())),
        )
    })
}

/// Convert a path to the forward-slash form used for project-relative asset paths.
pub fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
