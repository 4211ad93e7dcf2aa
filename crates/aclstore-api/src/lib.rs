//! # aclstore-api
//!
//! HTTP administration surface for the ACL store.
//!
//! All endpoints live under a configurable root path:
//! - `GET {root}/{name}` — members of an ACL
//! - `PUT {root}/{name}` — replace an ACL's members
//! - `POST {root}/{name}` — add or remove members
//! - `GET {root}/` — list all ACLs (admin only)
//!
//! Every request is authenticated with the configured
//! [`Authenticator`](aclstore_auth::Authenticator) and authorized by the
//! [`Manager`](aclstore::Manager) before the handler touches storage.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod routes;
pub mod server;

pub use error::{ApiError, Error, Result};
pub use routes::{AppState, router};
pub use server::{Server, ServerConfig};
