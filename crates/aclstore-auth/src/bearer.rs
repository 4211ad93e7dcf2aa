//! Bearer-token authentication.
//!
//! `BearerAuthenticator` pulls the token from the `Authorization` header and
//! hands it to a [`TokenValidator`]. Generic over `TokenValidator`; plug in
//! any identity provider.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use aclstore::Identity;
use aclstore::params::{CODE_UNAUTHORIZED, RemoteError};
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::{AuthConfig, AuthError, Authenticator, TokenValidator};

/// [`Authenticator`] for `Authorization: Bearer <token>` requests.
pub struct BearerAuthenticator<V: TokenValidator> {
    validator: Arc<V>,
    config: AuthConfig,
}

impl<V: TokenValidator> BearerAuthenticator<V> {
    /// Create a new authenticator with the given validator and config.
    pub fn new(validator: Arc<V>, config: AuthConfig) -> Self {
        Self { validator, config }
    }

    async fn identify(&self, parts: &http::request::Parts) -> Result<Arc<dyn Identity>, Response> {
        let Some(token) = extract_bearer_token(&parts.headers) else {
            return Err(unauthorized_response(
                &self.config.realm,
                &AuthError::MissingToken,
            ));
        };

        match self.validator.validate(token).await {
            Ok(user) => {
                log::debug!("Authenticated '{}'", user.username);
                Ok(Arc::new(user))
            }
            Err(auth_err) => {
                log::warn!("Authentication failed: {auth_err}");
                Err(unauthorized_response(&self.config.realm, &auth_err))
            }
        }
    }
}

impl<V: TokenValidator> Authenticator for BearerAuthenticator<V> {
    fn authenticate<'a>(
        &'a self,
        parts: &'a http::request::Parts,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<dyn Identity>, Response>> + Send + 'a>> {
        Box::pin(self.identify(parts))
    }
}

/// Extract bearer token from the Authorization header.
pub fn extract_bearer_token(headers: &http::HeaderMap) -> Option<&str> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Build the response for a failed authentication.
///
/// Client errors answer 401 with a `WWW-Authenticate` challenge; provider
/// failures answer 503.
pub fn unauthorized_response(realm: &str, err: &AuthError) -> Response {
    let status = if err.is_client_error() {
        StatusCode::UNAUTHORIZED
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = RemoteError::new(CODE_UNAUTHORIZED, err.to_string());

    let mut response = (
        status,
        [(http::header::CONTENT_TYPE, "application/json")],
        serde_json::to_string(&body).unwrap_or_default(),
    )
        .into_response();

    if status == StatusCode::UNAUTHORIZED {
        let challenge = format!(r#"Bearer realm="{realm}""#);
        if let Ok(value) = http::HeaderValue::from_str(&challenge) {
            response
                .headers_mut()
                .insert(http::header::WWW_AUTHENTICATE, value);
        }
    }

    response
}
