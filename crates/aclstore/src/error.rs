//! Error types for aclstore

use thiserror::Error;

/// Result type alias for aclstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in aclstore
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The named ACL has never been created
    #[error("ACL {name:?} not found")]
    AclNotFound {
        /// ACL that was looked up
        name: String,
    },

    /// A user name is empty or contains the member separator
    #[error("invalid user name {user:?}")]
    BadUsername {
        /// The offending user name
        user: String,
    },

    /// Attempt to create an ACL whose name is reserved for meta-ACLs
    #[error("invalid ACL name {name:?}")]
    InvalidAclName {
        /// The rejected name
        name: String,
    },

    /// A request named no ACL
    #[error("empty ACL name")]
    EmptyAclName,

    /// A modification asked to add and remove users in one call
    #[error("cannot add and remove users at the same time")]
    ConflictingModification,

    /// The identity is not covered by the checking ACL
    #[error("permission denied")]
    Forbidden,

    /// The backend cannot enumerate keys, so ACLs cannot be listed
    #[error("cannot list ACLs: {backend} backend does not support key enumeration")]
    Unsupported {
        /// Backend name
        backend: String,
    },

    /// The identity could not decide whether it is covered by an ACL
    #[error("cannot check permissions: {message}")]
    PermissionCheck {
        /// What went wrong
        message: String,
    },

    /// A stored ACL value is not valid UTF-8
    #[error("corrupt entry for ACL {name:?}")]
    CorruptEntry {
        /// ACL whose entry failed to decode
        name: String,
    },

    /// Error from the key-value backend
    #[error("Storage error: {0}")]
    Backend(#[from] aclstore_kv::Error),
}

impl Error {
    /// Creates a permission check error.
    pub fn permission_check<S: Into<String>>(message: S) -> Self {
        Error::PermissionCheck {
            message: message.into(),
        }
    }

    /// Returns whether the caller sent something unusable (as opposed to a
    /// missing ACL, a denial, or a server-side fault).
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Error::BadUsername { .. }
                | Error::InvalidAclName { .. }
                | Error::EmptyAclName
                | Error::ConflictingModification
        )
    }
}
