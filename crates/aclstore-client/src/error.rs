//! Error types for aclstore-client

use aclstore::params::CODE_ACL_NOT_FOUND;
use thiserror::Error;

/// Result type alias for aclstore-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in aclstore-client
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The server answered with an error status.
    #[error("{message} (HTTP {status})")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Error code from the response body, empty if the body had none
        code: String,
        /// Error message from the response body
        message: String,
    },

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The base URL cannot have path segments appended
    #[error("invalid base URL {0:?}")]
    InvalidBaseUrl(String),
}

impl Error {
    /// Returns `true` if the server reported that the ACL does not exist.
    pub fn is_acl_not_found(&self) -> bool {
        matches!(self, Error::Remote { code, .. } if code == CODE_ACL_NOT_FOUND)
    }

    /// The error code sent by the server, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Remote { code, .. } if !code.is_empty() => Some(code),
            _ => None,
        }
    }
}
