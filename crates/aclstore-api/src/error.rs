//! Error types for aclstore-api

use aclstore::params::{
    CODE_ACL_NOT_FOUND, CODE_BAD_REQUEST, CODE_FORBIDDEN, CODE_INTERNAL_ERROR, CODE_NOT_FOUND,
    CODE_NOT_IMPLEMENTED, RemoteError,
};
use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

/// Result type alias for aclstore-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up or running the server
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from the ACL manager
    #[error("ACL error: {0}")]
    Acl(#[from] aclstore::Error),

    /// I/O error (binding or serving the listener)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured root path cannot be used as a URL prefix
    #[error("invalid root path {0:?}: must be empty or start with '/'")]
    InvalidRootPath(String),
}

/// Failure of a single request, rendered as a JSON error body.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Error from the ACL manager or store
    #[error(transparent)]
    Acl(#[from] aclstore::Error),

    /// Request body could not be decoded
    #[error("cannot unmarshal request body: {0}")]
    BadBody(String),

    /// URL outside the served paths
    #[error("URL path not found")]
    PathNotFound,

    /// Authentication failed; the authenticator already built the response.
    #[error("authentication failed")]
    AuthenticationFailed(Response),
}

impl ApiError {
    /// Status code and wire error code for this failure.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        use aclstore::Error as E;
        match self {
            ApiError::Acl(E::AclNotFound { .. }) => (StatusCode::NOT_FOUND, CODE_ACL_NOT_FOUND),
            ApiError::Acl(E::Forbidden) => (StatusCode::FORBIDDEN, CODE_FORBIDDEN),
            ApiError::Acl(E::Unsupported { .. }) => {
                (StatusCode::NOT_IMPLEMENTED, CODE_NOT_IMPLEMENTED)
            }
            ApiError::Acl(e) if e.is_bad_request() => (StatusCode::BAD_REQUEST, CODE_BAD_REQUEST),
            ApiError::Acl(_) => (StatusCode::INTERNAL_SERVER_ERROR, CODE_INTERNAL_ERROR),
            ApiError::BadBody(_) => (StatusCode::BAD_REQUEST, CODE_BAD_REQUEST),
            ApiError::PathNotFound => (StatusCode::NOT_FOUND, CODE_NOT_FOUND),
            ApiError::AuthenticationFailed(resp) => (resp.status(), ""),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::AuthenticationFailed(response) = self {
            return response;
        }
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            log::error!("Request failed: {self}");
        }
        (status, Json(RemoteError::new(code, self.to_string()))).into_response()
    }
}
