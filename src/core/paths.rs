//! Path utilities
//!
//! Resolves the user-supplied search path and extracts entry base names.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::core::error::SearchError;

/// Turn the search path into an absolute, canonical one.
///
/// Relative paths resolve against the current working directory.
pub fn resolve_search_path(path: &Path) -> Result<PathBuf, SearchError> {
    path.canonicalize()
        .map_err(|source| SearchError::PathResolution {
            path: path.to_path_buf(),
            source,
        })
}

/// Final component of a path, or the whole path when it has none (`/`)
pub fn base_name(path: &Path) -> &OsStr {
    path.file_name().unwrap_or(path.as_os_str())
}

/// Render a path for line output
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
