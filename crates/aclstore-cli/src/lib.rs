//! # aclstore-cli
//!
//! Server and admin CLI for the ACL store.
//!
//! The `aclstore` binary provides:
//! - `serve` — run the HTTP server over a memory or redis backend
//! - `get`, `set`, `add`, `remove`, `list` — talk to a running server
//! - `config` — locate, create and inspect the TOML configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use error::{Error, Result};
