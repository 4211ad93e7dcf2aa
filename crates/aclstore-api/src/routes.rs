//! Router and handlers.

use std::sync::Arc;

use aclstore::params::{GetAclResponse, GetAclsResponse, ModifyAclRequest, SetAclRequest};
use aclstore::{ADMIN_ACL, Admission, Authorized, Manager};
use aclstore_auth::Authenticator;
use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Largest request body accepted.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ACL manager.
    pub manager: Arc<Manager>,
    /// Authenticator run for every request.
    pub authenticator: Arc<dyn Authenticator>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}

/// Build the router serving ACLs under `root_path`.
///
/// A trailing `/` on `root_path` is ignored; an empty root serves at `/`.
/// Anything outside the served paths answers 404 with code `not found`.
pub fn router(root_path: &str, state: AppState) -> Router {
    let root = root_path.trim_end_matches('/');
    Router::new()
        .route(&format!("{root}/"), get(list_acls))
        .route(
            &format!("{root}/{{name}}"),
            get(get_acl).put(set_acl).post(modify_acl),
        )
        .fallback(not_found)
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_acl(State(state): State<AppState>, Path(name): Path<String>, req: Request) -> Response {
    let (parts, _) = req.into_parts();
    let authorized = match admit(&state, &parts, &name).await {
        Ok(authorized) => authorized,
        Err(e) => return e.into_response(),
    };
    match authorized.get_acl().await {
        Ok(users) => Json(GetAclResponse { users }).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

async fn set_acl(State(state): State<AppState>, Path(name): Path<String>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let authorized = match admit(&state, &parts, &name).await {
        Ok(authorized) => authorized,
        Err(e) => return e.into_response(),
    };
    let result = async {
        let request: SetAclRequest = read_json(body).await?;
        authorized.set_acl(&request.users).await?;
        Ok::<_, ApiError>(())
    };
    match result.await {
        Ok(()) => {
            log::info!("Set ACL '{name}'");
            StatusCode::OK.into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn modify_acl(
    State(state): State<AppState>,
    Path(name): Path<String>,
    req: Request,
) -> Response {
    let (parts, body) = req.into_parts();
    let authorized = match admit(&state, &parts, &name).await {
        Ok(authorized) => authorized,
        Err(e) => return e.into_response(),
    };
    let result = async {
        let request: ModifyAclRequest = read_json(body).await?;
        authorized.modify_acl(&request.add, &request.remove).await?;
        Ok::<_, ApiError>(())
    };
    match result.await {
        Ok(()) => {
            log::info!("Modified ACL '{name}'");
            StatusCode::OK.into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn list_acls(State(state): State<AppState>, req: Request) -> Response {
    let (parts, _) = req.into_parts();
    let authorized = match admit(&state, &parts, ADMIN_ACL).await {
        Ok(authorized) => authorized,
        Err(e) => return e.into_response(),
    };
    match authorized.list_acls().await {
        Ok(acls) => Json(GetAclsResponse { acls }).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

async fn not_found() -> ApiError {
    ApiError::PathNotFound
}

// ============================================================================
// Helpers
// ============================================================================

/// Authenticate the request and authorize it against `acl_name`.
async fn admit<'a>(
    state: &'a AppState,
    parts: &http::request::Parts,
    acl_name: &str,
) -> Result<Authorized<'a>, ApiError> {
    let admission = state
        .manager
        .admit(acl_name, || state.authenticator.authenticate(parts))
        .await?;
    match admission {
        Admission::Authorized(authorized) => Ok(authorized),
        Admission::AuthenticationFailed(response) => Err(ApiError::AuthenticationFailed(response)),
    }
}

async fn read_json<T: DeserializeOwned>(body: axum::body::Body) -> Result<T, ApiError> {
    let bytes: Bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiError::BadBody(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::BadBody(e.to_string()))
}

