//! ACL storage.
//!
//! [`AclStore`] is the membership CRUD used by the [`Manager`](crate::Manager).
//! [`KvAclStore`] implements it over any [`KvStore`]: each ACL is one key,
//! and every mutation is a single [`KvStore::update`] so concurrent writers
//! to the same ACL are serialized by the backend's compare-and-set.

use std::sync::Arc;

use aclstore_kv::{KvStore, Mutation};
use async_trait::async_trait;

use crate::codec::{decode, encode};
use crate::{Error, Result};

/// Result of [`AclStore::create_acl`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The ACL did not exist and was written with the initial members.
    Created,
    /// The ACL already existed; its membership was left untouched.
    AlreadyExists,
}

/// Persistent storage of named ACLs.
#[async_trait]
pub trait AclStore: Send + Sync {
    /// Create ACL `name` with `initial_users` unless it already exists.
    ///
    /// Fails with [`Error::BadUsername`] if the ACL is absent and any
    /// initial user is invalid; nothing is written in that case.
    async fn create_acl(&self, name: &str, initial_users: &[String]) -> Result<CreateOutcome>;

    /// Add `users` to ACL `name`. Users already present are ignored.
    async fn add(&self, name: &str, users: &[String]) -> Result<()>;

    /// Remove `users` from ACL `name`. Users not present are ignored.
    async fn remove(&self, name: &str, users: &[String]) -> Result<()>;

    /// Replace the membership of ACL `name` with `users`.
    async fn set(&self, name: &str, users: &[String]) -> Result<()>;

    /// Members of ACL `name`, sorted ascending.
    async fn get(&self, name: &str) -> Result<Vec<String>>;

    /// ACL enumeration, if the underlying storage supports it.
    fn lister(&self) -> Option<&dyn AclLister> {
        None
    }

    /// Storage name for diagnostics.
    fn backend_name(&self) -> &str;
}

/// Optional capability: enumerate stored ACLs.
#[async_trait]
pub trait AclLister: Send + Sync {
    /// Names of all stored ACLs, in no particular order.
    async fn acls(&self) -> Result<Vec<String>>;
}

/// [`AclStore`] over a key-value backend.
#[derive(Clone)]
pub struct KvAclStore {
    kv: Arc<dyn KvStore>,
}

impl KvAclStore {
    /// Wrap a key-value backend.
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Read-modify-write the membership of an existing ACL.
    ///
    /// `edit` receives the current members and returns the new ones; the
    /// result is canonicalized and validated before it is written.
    async fn modify<F>(&self, name: &str, mut edit: F) -> Result<()>
    where
        F: FnMut(Vec<String>) -> Vec<String> + Send,
    {
        let mut refusal: Option<Error> = None;
        let mut apply = |current: Option<&[u8]>| {
            refusal = None;
            let Some(value) = current else {
                refusal = Some(Error::AclNotFound {
                    name: name.to_string(),
                });
                return Mutation::Keep;
            };
            match decode(name, value).and_then(|members| encode(&edit(members))) {
                Ok(value) => Mutation::Put(value),
                Err(e) => {
                    refusal = Some(e);
                    Mutation::Keep
                }
            }
        };
        self.kv.update(name, &mut apply).await?;
        refusal.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for KvAclStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvAclStore")
            .field("backend", &self.kv.name())
            .finish()
    }
}

#[async_trait]
impl AclStore for KvAclStore {
    async fn create_acl(&self, name: &str, initial_users: &[String]) -> Result<CreateOutcome> {
        let mut outcome = Ok(CreateOutcome::Created);
        let mut apply = |current: Option<&[u8]>| {
            if current.is_some() {
                outcome = Ok(CreateOutcome::AlreadyExists);
                return Mutation::Keep;
            }
            match encode(initial_users) {
                Ok(value) => {
                    outcome = Ok(CreateOutcome::Created);
                    Mutation::Put(value)
                }
                Err(e) => {
                    outcome = Err(e);
                    Mutation::Keep
                }
            }
        };
        self.kv.update(name, &mut apply).await?;
        outcome
    }

    async fn add(&self, name: &str, users: &[String]) -> Result<()> {
        self.modify(name, |mut members| {
            members.extend_from_slice(users);
            members
        })
        .await
    }

    async fn remove(&self, name: &str, users: &[String]) -> Result<()> {
        self.modify(name, |mut members| {
            members.retain(|m| !users.contains(m));
            members
        })
        .await
    }

    async fn set(&self, name: &str, users: &[String]) -> Result<()> {
        // Validate up front: the new value does not depend on the old one.
        let value = encode(users)?;
        let mut found = true;
        let mut apply = |current: Option<&[u8]>| {
            found = current.is_some();
            if found {
                Mutation::Put(value.clone())
            } else {
                Mutation::Keep
            }
        };
        self.kv.update(name, &mut apply).await?;
        if !found {
            return Err(Error::AclNotFound {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Vec<String>> {
        match self.kv.get(name).await? {
            Some(value) => decode(name, &value),
            None => Err(Error::AclNotFound {
                name: name.to_string(),
            }),
        }
    }

    fn lister(&self) -> Option<&dyn AclLister> {
        self.kv.key_lister().map(|_| self as &dyn AclLister)
    }

    fn backend_name(&self) -> &str {
        self.kv.name()
    }
}

#[async_trait]
impl AclLister for KvAclStore {
    async fn acls(&self) -> Result<Vec<String>> {
        let lister = self.kv.key_lister().ok_or_else(|| Error::Unsupported {
            backend: self.kv.name().to_string(),
        })?;
        Ok(lister.keys().await?)
    }
}

// ============================================================================
// Tests
// ============================================================================
