//! Error types for aclstore-kv

use thiserror::Error;

/// Result type alias for aclstore-kv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in aclstore-kv
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error reported by the Redis client or server
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    /// An in-process lock was poisoned by a panicking writer
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// The backend returned a reply the store could not interpret
    #[error("Unexpected backend reply: {0}")]
    UnexpectedReply(String),
}
