//! Error types for the suffix tree index

use crate::index::types::KeyId;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Library error type
#[derive(Error, Debug)]
pub enum Error {
    /// A key was inserted with an id lower than a previously inserted one.
    /// The tree is left untouched.
    #[error("out of order insertion: got id {id}, expected at least {last}")]
    OutOfOrderInsertion { id: KeyId, last: KeyId },

    /// A persisted index file is truncated, inconsistent or references
    /// entries that do not exist.
    #[error("malformed index file {}: {reason}", path.display())]
    MalformedPersistedData { path: PathBuf, reason: String },

    /// I/O failure while reading or writing index files
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a malformed data error for `path`
    pub fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        Error::MalformedPersistedData {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this error came from a persisted file failing validation
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedPersistedData { .. })
    }
}
