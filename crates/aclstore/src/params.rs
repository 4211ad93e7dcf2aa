//! Request and response bodies exchanged over HTTP.
//!
//! Shared by the server adapter and the client so both sides agree on the
//! wire format.

use serde::{Deserialize, Serialize};

/// Error code for a request naming an ACL that does not exist.
pub const CODE_ACL_NOT_FOUND: &str = "ACL not found";
/// Error code for a malformed or invalid request.
pub const CODE_BAD_REQUEST: &str = "bad request";
/// Error code for a request the identity is not allowed to make.
pub const CODE_FORBIDDEN: &str = "forbidden";
/// Error code for a URL outside the served paths.
pub const CODE_NOT_FOUND: &str = "not found";
/// Error code for a request without acceptable credentials.
pub const CODE_UNAUTHORIZED: &str = "unauthorized";
/// Error code for an operation the backend cannot perform.
pub const CODE_NOT_IMPLEMENTED: &str = "not implemented";
/// Error code for a server-side fault.
pub const CODE_INTERNAL_ERROR: &str = "internal error";

/// Body of `GET /{name}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAclResponse {
    /// Members, sorted ascending.
    pub users: Vec<String>,
}

/// Body of `PUT /{name}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAclRequest {
    /// Complete new membership.
    #[serde(default)]
    pub users: Vec<String>,
}

/// Body of `POST /{name}`. At most one of the two lists may be non-empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyAclRequest {
    /// Users to add.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add: Vec<String>,
    /// Users to remove.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove: Vec<String>,
}

/// Body of `GET /`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAclsResponse {
    /// All ACL names, sorted ascending.
    pub acls: Vec<String>,
}

/// Error body returned with every non-2xx status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// Human-readable description.
    pub message: String,
    /// Stable machine-readable code (one of the `CODE_*` constants).
    pub code: String,
}

impl RemoteError {
    /// Build an error body.
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.to_string(),
        }
    }
}
