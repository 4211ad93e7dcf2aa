//! # aclstore-client
//!
//! Rust client for the ACL store HTTP API.
//!
//! [`AclClient`] wraps the four endpoints served by `aclstore-api`:
//! - `get` / `set` — read or replace an ACL's members
//! - `add` / `remove` — change membership incrementally
//! - `acls` — list every ACL (requires admin permission)
//!
//! Server-side failures surface as [`Error::Remote`] carrying the status,
//! error code and message from the response body.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod client;
pub mod error;

pub use client::AclClient;
pub use error::{Error, Result};
