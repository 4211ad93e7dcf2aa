//! Fixed token table.
//!
//! Maps opaque bearer tokens to users. Suitable for service accounts and
//! small deployments where tokens are provisioned through configuration.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{AuthError, AuthenticatedUser, TokenValidator};

/// One configured token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    /// The bearer token.
    pub token: String,
    /// User the token authenticates as.
    pub user: String,
    /// Groups the user belongs to.
    #[serde(default)]
    pub groups: Vec<String>,
}

/// [`TokenValidator`] backed by an in-memory token table.
pub struct StaticTokenValidator {
    tokens: HashMap<String, AuthenticatedUser>,
}

impl StaticTokenValidator {
    /// Build the table from configured entries. A later entry for the same
    /// token replaces an earlier one.
    pub fn new(entries: impl IntoIterator<Item = TokenEntry>) -> Self {
        let tokens = entries
            .into_iter()
            .map(|e| {
                let user = AuthenticatedUser::new(e.user).with_groups(e.groups);
                (e.token, user)
            })
            .collect();
        Self { tokens }
    }

    /// Number of configured tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if no tokens are configured.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl std::fmt::Debug for StaticTokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenValidator")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

impl TokenValidator for StaticTokenValidator {
    fn validate(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>> {
        let result = self.tokens.get(token).cloned().ok_or(AuthError::UnknownToken);
        Box::pin(async move { result })
    }
}
