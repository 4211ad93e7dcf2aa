//! Error types for aclstore-cli

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for aclstore-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in aclstore-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid or unusable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error on a specific file
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Error from the key-value backend
    #[error("Backend error: {0}")]
    Backend(#[from] aclstore_kv::Error),

    /// Error from the ACL manager
    #[error("ACL error: {0}")]
    Acl(#[from] aclstore::Error),

    /// Error from the HTTP server
    #[error("Server error: {0}")]
    Server(#[from] aclstore_api::Error),

    /// Error from aclstore-client
    #[error("Client error: {0}")]
    Client(#[from] aclstore_client::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Wrap an I/O error with the path it occurred on.
    pub fn io_with_path(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
