//! Auth-specific error types.

/// Errors that can occur during authentication.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header or bearer token present.
    #[error("missing authentication token")]
    MissingToken,

    /// Token format is invalid.
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    /// The token is well-formed but not recognised.
    #[error("unknown token")]
    UnknownToken,

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// The identity provider could not be consulted.
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl AuthError {
    /// Whether this error should result in a 401 (vs. a 503).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidFormat(_)
                | AuthError::UnknownToken
                | AuthError::Expired
        )
    }
}
