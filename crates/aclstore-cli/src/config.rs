//! Configuration file for the `aclstore` binary.
//!
//! ```toml
//! admin_users = ["root"]
//!
//! [[acls]]
//! name = "pets"
//! users = ["alice"]
//!
//! [server]
//! listen = "127.0.0.1:8080"
//! root_path = "/acl"
//!
//! [backend]
//! kind = "redis"
//! url = "redis://127.0.0.1/"
//! key_prefix = "aclstore:"
//!
//! [auth]
//! realm = "aclstore"
//!
//! [[auth.tokens]]
//! token = "s3cret"
//! user = "root"
//! groups = ["ops"]
//! ```
//!
//! Every section is optional; a missing file at the default location yields
//! the defaults. Each `[[acls]]` entry is created with its meta-ACL when the
//! server starts, unless it already exists.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use aclstore_auth::TokenEntry;
use aclstore_kv::redis_store::DEFAULT_KEY_PREFIX;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "ACLSTORE_CONFIG";

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AclstoreConfig {
    /// Members of the admin ACL when the server first creates it.
    pub admin_users: Vec<String>,
    /// ACLs created at startup if absent.
    pub acls: Vec<AclDeclaration>,
    /// HTTP server settings.
    pub server: ServerSection,
    /// Storage backend settings.
    pub backend: BackendSection,
    /// Authentication settings.
    pub auth: AuthSection,
}

/// One `[[acls]]` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AclDeclaration {
    /// ACL name; must not be empty, `admin`, or carry the meta prefix.
    pub name: String,
    /// Initial members, used only when the ACL is created.
    #[serde(default)]
    pub users: Vec<String>,
}

/// `[server]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Address to listen on.
    pub listen: SocketAddr,
    /// URL prefix for all ACL routes.
    pub root_path: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            root_path: String::new(),
        }
    }
}

/// Which key-value backend stores the ACLs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process map; contents are lost on exit.
    #[default]
    Memory,
    /// Redis server.
    Redis,
}

/// `[backend]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendSection {
    /// Backend kind.
    pub kind: BackendKind,
    /// Connection URL, required for redis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Prefix prepended to every key.
    pub key_prefix: String,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            url: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

/// `[auth]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthSection {
    /// Realm announced in 401 challenges.
    pub realm: String,
    /// Bearer tokens accepted by the server.
    pub tokens: Vec<TokenEntry>,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            realm: aclstore_auth::AuthConfig::default().realm,
            tokens: Vec::new(),
        }
    }
}

impl AclstoreConfig {
    /// `<config dir>/aclstore/config.toml`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("aclstore").join("config.toml"))
    }

    /// The file [`load`](Self::load) would read: `explicit`, else
    /// `$ACLSTORE_CONFIG`, else the default path.
    pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(Self::default_config_path)
    }

    /// Load and validate the configuration.
    ///
    /// An explicitly named file must exist. A missing file at the default
    /// location yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit.is_some() || std::env::var_os(CONFIG_ENV).is_some();
        let Some(path) = Self::resolve_config_path(explicit) else {
            log::debug!("No config directory on this platform; using defaults");
            return Ok(Self::default());
        };
        if !named && !path.exists() {
            log::debug!("No config file at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    /// Read, parse and validate `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = Self::from_toml(&content)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Check constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let root = &self.server.root_path;
        if !root.is_empty() && !root.starts_with('/') {
            return Err(Error::config(format!(
                "server.root_path {root:?} must start with '/'"
            )));
        }
        if root.ends_with('/') {
            return Err(Error::config(format!(
                "server.root_path {root:?} must not end with '/'"
            )));
        }
        if self.backend.kind == BackendKind::Redis && self.backend.url.is_none() {
            return Err(Error::config("backend.url is required for the redis backend"));
        }
        if let Some(user) = self
            .admin_users
            .iter()
            .find(|u| !aclstore::codec::is_valid_user(u))
        {
            return Err(Error::config(format!("invalid admin user name {user:?}")));
        }
        for acl in &self.acls {
            let name = &acl.name;
            if name.is_empty() || name == aclstore::ADMIN_ACL || aclstore::is_meta_name(name) {
                return Err(Error::config(format!("invalid declared ACL name {name:?}")));
            }
            if let Some(user) = acl.users.iter().find(|u| !aclstore::codec::is_valid_user(u)) {
                return Err(Error::config(format!(
                    "invalid user name {user:?} in ACL {name:?}"
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AclstoreConfig::from_toml("").unwrap();
        assert_eq!(config, AclstoreConfig::default());
        assert_eq!(config.backend.kind, BackendKind::Memory);
        assert_eq!(config.backend.key_prefix, "aclstore:");
        assert_eq!(config.auth.realm, "aclstore");
        assert_eq!(config.server.listen.port(), 8080);
    }

    #[test]
    fn test_full_document() {
        let config = AclstoreConfig::from_toml(
            r#"
            admin_users = ["root"]

            [[acls]]
            name = "pets"
            users = ["alice", "bob"]

            [[acls]]
            name = "empty"

            [server]
            listen = "0.0.0.0:9000"
            root_path = "/acl"

            [backend]
            kind = "redis"
            url = "redis://localhost/"
            key_prefix = "test:"

            [auth]
            realm = "corp"

            [[auth.tokens]]
            token = "t1"
            user = "root"
            groups = ["ops"]

            [[auth.tokens]]
            token = "t2"
            user = "alice"
            "#,
        )
        .unwrap();
        assert_eq!(config.admin_users, vec!["root".to_string()]);
        assert_eq!(config.acls.len(), 2);
        assert_eq!(config.acls[0].name, "pets");
        assert_eq!(config.acls[0].users, vec!["alice".to_string(), "bob".to_string()]);
        assert!(config.acls[1].users.is_empty());
        assert_eq!(config.server.listen.port(), 9000);
        assert_eq!(config.server.root_path, "/acl");
        assert_eq!(config.backend.kind, BackendKind::Redis);
        assert_eq!(config.backend.url.as_deref(), Some("redis://localhost/"));
        assert_eq!(config.backend.key_prefix, "test:");
        assert_eq!(config.auth.realm, "corp");
        assert_eq!(config.auth.tokens.len(), 2);
        assert_eq!(config.auth.tokens[0].groups, vec!["ops".to_string()]);
        assert!(config.auth.tokens[1].groups.is_empty());
    }

    #[test]
    fn test_relative_root_path_rejected() {
        let err = AclstoreConfig::from_toml("[server]\nroot_path = \"acl\"").unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn test_trailing_slash_rejected() {
        let err = AclstoreConfig::from_toml("[server]\nroot_path = \"/acl/\"").unwrap_err();
        assert!(err.to_string().contains("must not end with '/'"));
    }

    #[test]
    fn test_redis_requires_url() {
        let err = AclstoreConfig::from_toml("[backend]\nkind = \"redis\"").unwrap_err();
        assert!(err.to_string().contains("backend.url"));
    }

    #[test]
    fn test_invalid_admin_user_rejected() {
        let err = AclstoreConfig::from_toml(r#"admin_users = [""]"#).unwrap_err();
        assert!(err.to_string().contains("invalid admin user"));
    }

    #[test]
    fn test_invalid_declared_acl_names_rejected() {
        for name in ["", "_pets", "admin"] {
            let doc = format!("[[acls]]\nname = {name:?}\n");
            let err = AclstoreConfig::from_toml(&doc).unwrap_err();
            assert!(err.to_string().contains("invalid declared ACL name"), "{name:?}");
        }
    }

    #[test]
    fn test_invalid_declared_acl_user_rejected() {
        let err = AclstoreConfig::from_toml("[[acls]]\nname = \"pets\"\nusers = [\"\"]\n")
            .unwrap_err();
        assert!(err.to_string().contains("in ACL \"pets\""));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(AclstoreConfig::from_toml("[server]\nport = 1").is_err());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(AclstoreConfig::from_toml("[backend]\nkind = \"etcd\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "admin_users = [\"root\"]").unwrap();
        let config = AclstoreConfig::from_file(file.path()).unwrap();
        assert_eq!(config.admin_users, vec!["root".to_string()]);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = AclstoreConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        let path = Path::new("/tmp/explicit.toml");
        assert_eq!(
            AclstoreConfig::resolve_config_path(Some(path)),
            Some(path.to_path_buf())
        );
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let text = AclstoreConfig::default().to_toml_string().unwrap();
        assert_eq!(
            AclstoreConfig::from_toml(&text).unwrap(),
            AclstoreConfig::default()
        );
    }
}
