//! Input validation primitives for user-supplied paths.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Expand a leading `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).to_string())
}

/// Require `path` to be an existing directory.
pub fn require_directory(path: &Path, field: &str) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    Err(Error::validation_invalid_argument(
        field,
        format!("Not a directory: {}", path.display()),
        Some(path.display().to_string()),
        None,
    ))
}
