//! Authenticated user identity.

use aclstore::Identity;
use async_trait::async_trait;

/// An authenticated user, produced by a [`TokenValidator`](crate::TokenValidator).
///
/// Covered by an ACL that names the user directly or names one of the
/// user's groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The user name as it appears in ACLs.
    pub username: String,
    /// Group names the user belongs to.
    pub groups: Vec<String>,
}

impl AuthenticatedUser {
    /// A user with no groups.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            groups: Vec::new(),
        }
    }

    /// Add group memberships.
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.extend(groups.into_iter().map(Into::into));
        self
    }

    fn is_covered_by(&self, entry: &str) -> bool {
        entry == self.username || self.groups.iter().any(|g| g == entry)
    }
}

#[async_trait]
impl Identity for AuthenticatedUser {
    async fn allow(&self, acl: &[String]) -> aclstore::Result<bool> {
        Ok(acl.iter().any(|entry| self.is_covered_by(entry)))
    }
}
