//! Request authentication for the ACL store.
//!
//! Provides:
//! - [`Authenticator`] — Turns an HTTP request into an [`Identity`], or writes its own failure response
//! - [`BearerAuthenticator`] — `Authorization: Bearer` authenticator parameterised over `TokenValidator`
//! - [`TokenValidator`] — Trait for async token validation (implement per provider)
//! - [`StaticTokenValidator`] — Fixed token → user table, loaded from configuration
//! - [`AuthenticatedUser`] — Identity extracted from a validated token
//! - [`AuthError`] — Auth-specific error types

mod bearer;
mod error;
mod static_tokens;
mod user;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use aclstore::Identity;
use axum::response::Response;

pub use bearer::{BearerAuthenticator, extract_bearer_token, unauthorized_response};
pub use error::AuthError;
pub use static_tokens::{StaticTokenValidator, TokenEntry};
pub use user::AuthenticatedUser;

/// Configuration for bearer authentication.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Realm announced in the `WWW-Authenticate` header of 401 responses.
    pub realm: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            realm: "aclstore".to_string(),
        }
    }
}

/// Authenticates incoming requests.
///
/// On failure the authenticator returns the complete response the client
/// should see; the server sends it unchanged and writes nothing else.
pub trait Authenticator: Send + Sync + 'static {
    /// Authenticate the request described by `parts`.
    fn authenticate<'a>(
        &'a self,
        parts: &'a http::request::Parts,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<dyn Identity>, Response>> + Send + 'a>>;
}

/// Trait for validating tokens and extracting user identity.
///
/// Implement this for each identity provider. [`BearerAuthenticator`] calls
/// `validate()` with the bearer token and uses the returned user as the
/// request's identity.
pub trait TokenValidator: Send + Sync + 'static {
    /// Validate a token and return the authenticated user.
    fn validate(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>>;
}
