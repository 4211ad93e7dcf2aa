//! # aclstore
//!
//! Named access control lists backed by a key-value store.
//!
//! This crate implements:
//! - [`codec`]: canonical byte encoding of ACL membership
//! - [`store`]: race-safe CRUD over ACLs ([`AclStore`], [`KvAclStore`])
//! - [`manager`]: the admin ACL → meta-ACL → ACL permission model ([`Manager`])
//! - [`params`]: request and response bodies of the HTTP surface
//!
//! Every ACL `x` is paired with a meta-ACL `_x` naming who may change `x`.
//! Meta-ACLs and the `admin` ACL itself are governed by `admin`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod manager;
pub mod params;
pub mod store;

pub use error::{Error, Result};
pub use manager::{
    ADMIN_ACL, Admission, Authorized, Identity, META_PREFIX, Manager, ManagerParams,
    check_acl_name, is_meta_name, meta_name,
};
pub use store::{AclLister, AclStore, CreateOutcome, KvAclStore};
