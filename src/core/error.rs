//! Error types for dirseek
//!
//! Only the search-path errors ever reach the user as a failure. Subtree
//! errors are recovered inside the walker and surface on the log channel.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while resolving what to search
#[derive(Error, Debug)]
pub enum SearchError {
    /// The supplied path does not canonicalize (missing or invalid)
    #[error("cannot resolve search path '{}': {source}", path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither a positional path nor --path was given
    #[error("no search path given (pass it as the last argument or with --path)")]
    MissingPath,
}

/// Errors recovered during traversal, one per abandoned subtree
#[derive(Error, Debug)]
pub enum SubtreeError {
    /// Enumerating a directory failed (permission denied, vanished, ...)
    #[error("cannot read '{}': {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The worker handling a directory panicked
    #[error("worker for '{}' panicked", path.display())]
    WorkerPanicked { path: PathBuf },
}

impl SubtreeError {
    /// The directory whose traversal was abandoned
    pub fn path(&self) -> &Path {
        match self {
            SubtreeError::Access { path, .. } => path,
            SubtreeError::WorkerPanicked { path } => path,
        }
    }

    /// Wrap a walkdir error raised while listing `dir`
    pub fn listing(dir: &Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(dir).to_path_buf();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        SubtreeError::Access { path, source }
    }
}
