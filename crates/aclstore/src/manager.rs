//! ACL manager and permission model.
//!
//! Three tiers decide who may touch an ACL:
//!
//! - the [`ADMIN_ACL`] governs itself and every meta-ACL;
//! - the meta-ACL `_x` (see [`meta_name`]) governs the ordinary ACL `x`;
//! - admins pass every check, whatever the meta-ACL says.
//!
//! A request runs through [`Manager::admit`]: the caller's authentication
//! function turns the request into an [`Identity`] (or produces its own
//! failure response), the manager resolves the checking ACL and asks the
//! identity whether it is covered. A successful check yields an
//! [`Authorized`] value that performs exactly one operation on the target
//! ACL and is consumed by it.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::store::{AclStore, CreateOutcome};
use crate::{Error, Result};

/// Name of the administrator ACL.
pub const ADMIN_ACL: &str = "admin";

/// Prefix that turns an ACL name into the name of its meta-ACL.
pub const META_PREFIX: &str = "_";

/// Name of the meta-ACL governing `name`.
pub fn meta_name(name: &str) -> String {
    format!("{META_PREFIX}{name}")
}

/// Returns `true` if `name` is reserved for meta-ACLs.
pub fn is_meta_name(name: &str) -> bool {
    name.starts_with(META_PREFIX)
}

/// Name of the ACL whose members may access `name`.
///
/// The admin ACL and meta-ACLs are checked against [`ADMIN_ACL`]; every
/// other ACL against its meta-ACL.
pub fn check_acl_name(name: &str) -> String {
    if name == ADMIN_ACL || is_meta_name(name) {
        ADMIN_ACL.to_string()
    } else {
        meta_name(name)
    }
}

/// An authenticated caller.
#[async_trait]
pub trait Identity: Send + Sync {
    /// Report whether this identity is covered by any entry of `acl`.
    ///
    /// Entries are user names (or whatever group names the identity
    /// understands). An error means the question could not be answered and
    /// is surfaced to the caller as a failure, never as a denial.
    async fn allow(&self, acl: &[String]) -> Result<bool>;
}

/// Parameters for [`Manager::new`].
#[derive(Clone)]
pub struct ManagerParams {
    /// Persistent storage for all ACLs.
    pub store: Arc<dyn AclStore>,
    /// Members of the admin ACL when it is first created.
    pub initial_admin_users: Vec<String>,
}

/// Outcome of [`Manager::admit`] that is not an error.
pub enum Admission<'a, R> {
    /// The identity may perform one operation on the requested ACL.
    Authorized(Authorized<'a>),
    /// Authentication failed and produced its own response, which must be
    /// returned to the caller unchanged.
    AuthenticationFailed(R),
}

/// Manages a set of ACLs and enforces the permission model over them.
#[derive(Clone)]
pub struct Manager {
    store: Arc<dyn AclStore>,
}

impl Manager {
    /// Create a manager, ensuring the admin ACL exists.
    ///
    /// The admin ACL receives `initial_admin_users` only if this call creates
    /// it; an existing admin ACL keeps its membership.
    pub async fn new(params: ManagerParams) -> Result<Self> {
        let outcome = params
            .store
            .create_acl(ADMIN_ACL, &params.initial_admin_users)
            .await?;
        match outcome {
            CreateOutcome::Created => log::info!(
                "Created admin ACL with {} initial user(s)",
                params.initial_admin_users.len()
            ),
            CreateOutcome::AlreadyExists => log::debug!("Admin ACL already exists"),
        }
        Ok(Self {
            store: params.store,
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn AclStore> {
        &self.store
    }

    /// Members of ACL `name`, without any permission check.
    pub async fn acl(&self, name: &str) -> Result<Vec<String>> {
        self.store.get(name).await
    }

    /// Create ACL `name` together with its meta-ACL.
    ///
    /// `name` must not carry the meta prefix. Both ACLs are created only if
    /// absent; the meta-ACL starts empty, so initially only admins may change
    /// `name`.
    pub async fn create_acl(&self, name: &str, initial_users: &[String]) -> Result<CreateOutcome> {
        if name.is_empty() {
            return Err(Error::EmptyAclName);
        }
        if is_meta_name(name) {
            return Err(Error::InvalidAclName {
                name: name.to_string(),
            });
        }
        let outcome = self.store.create_acl(name, initial_users).await?;
        self.store.create_acl(&meta_name(name), &[]).await?;
        if outcome == CreateOutcome::Created {
            log::info!("Created ACL '{name}'");
        }
        Ok(outcome)
    }

    /// Authenticate a request and authorize it against `acl_name`.
    ///
    /// `authenticate` runs only if `acl_name` is non-empty. If it fails, its
    /// error value is handed back as [`Admission::AuthenticationFailed`] and
    /// nothing else happens. A denied identity yields [`Error::Forbidden`].
    pub async fn admit<F, Fut, R>(&self, acl_name: &str, authenticate: F) -> Result<Admission<'_, R>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Arc<dyn Identity>, R>>,
    {
        if acl_name.is_empty() {
            return Err(Error::EmptyAclName);
        }
        let identity = match authenticate().await {
            Ok(identity) => identity,
            Err(response) => return Ok(Admission::AuthenticationFailed(response)),
        };
        let authorized = self.authorize(identity.as_ref(), acl_name).await?;
        Ok(Admission::Authorized(authorized))
    }

    /// Check whether `identity` may access ACL `acl_name`.
    pub async fn authorize(&self, identity: &dyn Identity, acl_name: &str) -> Result<Authorized<'_>> {
        if acl_name.is_empty() {
            return Err(Error::EmptyAclName);
        }
        let check_name = check_acl_name(acl_name);
        let mut acl = match self.store.get(&check_name).await {
            // A missing meta-ACL means the requested ACL was never created.
            Err(Error::AclNotFound { .. }) if check_name != ADMIN_ACL => {
                return Err(Error::AclNotFound {
                    name: acl_name.to_string(),
                });
            }
            other => other?,
        };
        if check_name != ADMIN_ACL {
            acl.extend(self.store.get(ADMIN_ACL).await?);
        }
        if !identity.allow(&acl).await? {
            log::debug!("Access to ACL '{acl_name}' denied by '{check_name}'");
            return Err(Error::Forbidden);
        }
        log::debug!("Access to ACL '{acl_name}' granted by '{check_name}'");
        Ok(Authorized {
            manager: self,
            acl_name: acl_name.to_string(),
        })
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}

/// Permission to perform one operation on one ACL.
///
/// Obtained from [`Manager::authorize`]; every operation consumes it.
#[derive(Debug)]
pub struct Authorized<'a> {
    manager: &'a Manager,
    acl_name: String,
}

impl Authorized<'_> {
    /// The ACL this permission covers.
    pub fn acl_name(&self) -> &str {
        &self.acl_name
    }

    /// Members of the ACL, sorted ascending.
    pub async fn get_acl(self) -> Result<Vec<String>> {
        self.manager.store.get(&self.acl_name).await
    }

    /// Replace the ACL's membership with `users`.
    pub async fn set_acl(self, users: &[String]) -> Result<()> {
        self.manager.store.set(&self.acl_name, users).await
    }

    /// Add or remove users. Supplying both lists non-empty is an error;
    /// supplying neither does nothing.
    pub async fn modify_acl(self, add: &[String], remove: &[String]) -> Result<()> {
        match (add.is_empty(), remove.is_empty()) {
            (false, false) => Err(Error::ConflictingModification),
            (false, true) => self.manager.store.add(&self.acl_name, add).await,
            (true, false) => self.manager.store.remove(&self.acl_name, remove).await,
            (true, true) => Ok(()),
        }
    }

    /// Names of all ACLs, sorted ascending. Requires permission on the
    /// admin ACL.
    pub async fn list_acls(self) -> Result<Vec<String>> {
        if self.acl_name != ADMIN_ACL {
            return Err(Error::Forbidden);
        }
        let store = &self.manager.store;
        let lister = store.lister().ok_or_else(|| Error::Unsupported {
            backend: store.backend_name().to_string(),
        })?;
        let mut acls = lister.acls().await?;
        acls.sort();
        Ok(acls)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KvAclStore;
    use aclstore_kv::MemoryStore;
    use std::sync::Mutex;

    fn users(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Identity that is covered by ACLs naming it, and records what it saw.
    struct User {
        name: &'static str,
        checked: Mutex<Vec<Vec<String>>>,
    }

    impl User {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                checked: Mutex::new(Vec::new()),
            }
        }

        fn last_checked(&self) -> Vec<String> {
            self.checked.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl Identity for User {
        async fn allow(&self, acl: &[String]) -> Result<bool> {
            self.checked.lock().unwrap().push(acl.to_vec());
            Ok(acl.iter().any(|u| u == self.name))
        }
    }

    struct Broken;

    #[async_trait]
    impl Identity for Broken {
        async fn allow(&self, _acl: &[String]) -> Result<bool> {
            Err(Error::permission_check("identity provider unreachable"))
        }
    }

    async fn new_manager(admins: &[&str]) -> Manager {
        let store = Arc::new(KvAclStore::new(Arc::new(MemoryStore::new())));
        Manager::new(ManagerParams {
            store,
            initial_admin_users: users(admins),
        })
        .await
        .unwrap()
    }

    /// Admin = {bob}, _x = {alice}, x = {carol}.
    async fn cascade_fixture() -> Manager {
        let m = new_manager(&["bob"]).await;
        m.create_acl("x", &users(&["carol"])).await.unwrap();
        m.store().set("_x", &users(&["alice"])).await.unwrap();
        m
    }

    #[test]
    fn test_naming() {
        assert_eq!(meta_name("foo"), "_foo");
        assert!(is_meta_name("_foo"));
        assert!(!is_meta_name("foo"));
        assert_eq!(check_acl_name("admin"), "admin");
        assert_eq!(check_acl_name("_foo"), "admin");
        assert_eq!(check_acl_name("foo"), "_foo");
    }

    #[tokio::test]
    async fn test_new_creates_admin_acl_once() {
        let store: Arc<dyn AclStore> = Arc::new(KvAclStore::new(Arc::new(MemoryStore::new())));
        let m = Manager::new(ManagerParams {
            store: store.clone(),
            initial_admin_users: users(&["bob", "alice"]),
        })
        .await
        .unwrap();
        assert_eq!(m.acl(ADMIN_ACL).await.unwrap(), users(&["alice", "bob"]));

        let m2 = Manager::new(ManagerParams {
            store,
            initial_admin_users: users(&["mallory"]),
        })
        .await
        .unwrap();
        assert_eq!(m2.acl(ADMIN_ACL).await.unwrap(), users(&["alice", "bob"]));
    }

    #[tokio::test]
    async fn test_new_rejects_bad_admin_user() {
        let store = Arc::new(KvAclStore::new(Arc::new(MemoryStore::new())));
        let err = Manager::new(ManagerParams {
            store,
            initial_admin_users: users(&[""]),
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::BadUsername { .. }));
    }

    #[tokio::test]
    async fn test_create_acl_creates_meta_acl() {
        let m = new_manager(&["bob"]).await;
        let outcome = m.create_acl("foo", &users(&["a"])).await.unwrap();
        assert_eq!(outcome, CreateOutcome::Created);
        assert_eq!(m.acl("foo").await.unwrap(), users(&["a"]));
        assert_eq!(m.acl("_foo").await.unwrap(), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_create_acl_existing_keeps_members() {
        let m = new_manager(&["bob"]).await;
        m.create_acl("foo", &users(&["a"])).await.unwrap();
        m.store().set("_foo", &users(&["owner"])).await.unwrap();
        let outcome = m.create_acl("foo", &users(&["z"])).await.unwrap();
        assert_eq!(outcome, CreateOutcome::AlreadyExists);
        assert_eq!(m.acl("foo").await.unwrap(), users(&["a"]));
        assert_eq!(m.acl("_foo").await.unwrap(), users(&["owner"]));
    }

    #[tokio::test]
    async fn test_create_acl_rejects_meta_name() {
        let m = new_manager(&["bob"]).await;
        let err = m.create_acl("_foo", &[]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidAclName { ref name } if name == "_foo"));
        assert!(matches!(m.acl("_foo").await, Err(Error::AclNotFound { .. })));
        assert!(matches!(m.acl("__foo").await, Err(Error::AclNotFound { .. })));
    }

    #[tokio::test]
    async fn test_meta_member_may_set() {
        let m = cascade_fixture().await;
        let alice = User::new("alice");
        m.authorize(&alice, "x")
            .await
            .unwrap()
            .set_acl(&users(&["dave"]))
            .await
            .unwrap();
        assert_eq!(alice.last_checked(), users(&["alice", "bob"]));
        assert_eq!(m.acl("x").await.unwrap(), users(&["dave"]));
    }

    #[tokio::test]
    async fn test_admin_may_set() {
        let m = cascade_fixture().await;
        let bob = User::new("bob");
        m.authorize(&bob, "x")
            .await
            .unwrap()
            .set_acl(&users(&["erin"]))
            .await
            .unwrap();
        assert_eq!(m.acl("x").await.unwrap(), users(&["erin"]));
    }

    #[tokio::test]
    async fn test_plain_member_may_not_modify_or_read() {
        let m = cascade_fixture().await;
        let carol = User::new("carol");
        let err = m.authorize(&carol, "x").await.unwrap_err();
        assert!(matches!(err, Error::Forbidden));
        assert_eq!(m.acl("x").await.unwrap(), users(&["carol"]));
    }

    #[tokio::test]
    async fn test_meta_acl_checked_against_admin_only() {
        let m = cascade_fixture().await;
        let alice = User::new("alice");
        assert!(matches!(
            m.authorize(&alice, "_x").await.unwrap_err(),
            Error::Forbidden
        ));
        assert_eq!(alice.last_checked(), users(&["bob"]));

        let bob = User::new("bob");
        let members = m.authorize(&bob, "_x").await.unwrap().get_acl().await.unwrap();
        assert_eq!(members, users(&["alice"]));
    }

    #[tokio::test]
    async fn test_missing_meta_acl_is_not_found() {
        let m = new_manager(&["bob"]).await;
        let bob = User::new("bob");
        let err = m.authorize(&bob, "ghost").await.unwrap_err();
        assert!(matches!(err, Error::AclNotFound { ref name } if name == "ghost"));
    }

    #[tokio::test]
    async fn test_identity_error_is_surfaced() {
        let m = cascade_fixture().await;
        let err = m.authorize(&Broken, "x").await.unwrap_err();
        assert!(matches!(err, Error::PermissionCheck { .. }));
    }

    #[tokio::test]
    async fn test_modify_acl_rules() {
        let m = cascade_fixture().await;
        let bob = User::new("bob");

        let err = m
            .authorize(&bob, "x")
            .await
            .unwrap()
            .modify_acl(&users(&["a"]), &users(&["carol"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConflictingModification));
        assert_eq!(m.acl("x").await.unwrap(), users(&["carol"]));

        m.authorize(&bob, "x")
            .await
            .unwrap()
            .modify_acl(&users(&["a"]), &[])
            .await
            .unwrap();
        m.authorize(&bob, "x")
            .await
            .unwrap()
            .modify_acl(&[], &users(&["carol"]))
            .await
            .unwrap();
        m.authorize(&bob, "x")
            .await
            .unwrap()
            .modify_acl(&[], &[])
            .await
            .unwrap();
        assert_eq!(m.acl("x").await.unwrap(), users(&["a"]));
    }

    #[tokio::test]
    async fn test_list_acls_sorted() {
        let m = new_manager(&["bob"]).await;
        m.create_acl("zeta", &[]).await.unwrap();
        m.create_acl("alpha", &[]).await.unwrap();
        let bob = User::new("bob");
        let acls = m
            .authorize(&bob, ADMIN_ACL)
            .await
            .unwrap()
            .list_acls()
            .await
            .unwrap();
        assert_eq!(acls, users(&["_alpha", "_zeta", "admin", "alpha", "zeta"]));
    }

    #[tokio::test]
    async fn test_list_acls_requires_admin_scope() {
        let m = cascade_fixture().await;
        let alice = User::new("alice");
        let err = m
            .authorize(&alice, "x")
            .await
            .unwrap()
            .list_acls()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden));
    }

    #[tokio::test]
    async fn test_list_acls_unsupported_backend() {
        let store = Arc::new(KvAclStore::new(Arc::new(
            MemoryStore::new().without_key_listing(),
        )));
        let m = Manager::new(ManagerParams {
            store,
            initial_admin_users: users(&["bob"]),
        })
        .await
        .unwrap();
        let bob = User::new("bob");
        let err = m
            .authorize(&bob, ADMIN_ACL)
            .await
            .unwrap()
            .list_acls()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
    }

    #[tokio::test]
    async fn test_admit_authentication_failure_passes_response_through() {
        let m = cascade_fixture().await;
        let admission = m
            .admit("x", || async { Err::<Arc<dyn Identity>, _>("401 written") })
            .await
            .unwrap();
        assert!(matches!(
            admission,
            Admission::AuthenticationFailed("401 written")
        ));
    }

    #[tokio::test]
    async fn test_admit_authorized() {
        let m = cascade_fixture().await;
        let admission = m
            .admit("x", || async {
                Ok::<_, ()>(Arc::new(User::new("alice")) as Arc<dyn Identity>)
            })
            .await
            .unwrap();
        match admission {
            Admission::Authorized(a) => assert_eq!(a.acl_name(), "x"),
            Admission::AuthenticationFailed(()) => panic!("expected authorization"),
        }
    }

    #[tokio::test]
    async fn test_admit_empty_name_skips_authentication() {
        let m = cascade_fixture().await;
        let mut called = false;
        let result = m
            .admit("", || {
                called = true;
                async { Err::<Arc<dyn Identity>, ()>(()) }
            })
            .await;
        assert!(matches!(result, Err(Error::EmptyAclName)));
        assert!(!called);
    }
}
