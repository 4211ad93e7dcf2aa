//! # aclstore-kv
//!
//! Key-value backends for the ACL store.
//!
//! This crate provides:
//! - [`KvStore`]: single-key `get` plus an optimistic read-modify-write `update`
//! - [`KeyLister`]: optional key enumeration, discovered via [`KvStore::key_lister`]
//! - [`MemoryStore`]: versioned in-process map (tests, single-node deployments)
//! - [`RedisStore`]: Redis-backed store using a server-side compare-and-set

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod error;
pub mod memory;
pub mod redis_store;
pub mod traits;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use traits::{Committed, KeyLister, KvStore, Mutation, UpdateFn};
