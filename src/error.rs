//! Errors raised at the I/O edges: loading, watching, journaling and configuration.
//!
//! The section store itself never fails; these only surface from collaborators.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
/// Failure of an I/O-facing collaborator.
pub enum Error {
    #[error("failed to read or write {path}: {source}")]
    /// File access failed.
    Io {
        /// File being accessed.
        path: PathBuf,
        #[source]
        /// Underlying I/O error.
        source: io::Error,
    },
    #[error("invalid section document: {0}")]
    /// Section or record JSON could not be (de)serialised.
    Json(#[from] serde_json::Error),
    #[error("failed to watch for changes: {0}")]
    /// The file watcher could not be installed.
    Watch(#[from] notify::Error),
    #[error("invalid configuration: {0}")]
    /// `sectree.toml` could not be parsed.
    Config(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for collaborator operations.
pub type Result<T> = std::result::Result<T, Error>;
