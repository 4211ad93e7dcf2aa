//! Command handlers.

use std::path::Path;
use std::sync::Arc;

use aclstore::{CreateOutcome, KvAclStore, Manager, ManagerParams};
use aclstore_api::{Server, ServerConfig};
use aclstore_auth::{AuthConfig, BearerAuthenticator, StaticTokenValidator};
use aclstore_client::AclClient;
use aclstore_kv::{KvStore, MemoryStore, RedisStore};

use crate::cli::{Cli, Command, ConfigAction, RemoteArgs};
use crate::config::{AclstoreConfig, BackendKind};
use crate::{Error, Result};

/// Run the parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Serve => {
            let config = AclstoreConfig::load(config_path)?;
            serve(config, shutdown_signal()).await
        }
        Command::Get { name, remote } => {
            for user in client(&remote)?.get(&name).await? {
                println!("{user}");
            }
            Ok(())
        }
        Command::Set {
            name,
            users,
            remote,
        } => Ok(client(&remote)?.set(&name, &users).await?),
        Command::Add {
            name,
            users,
            remote,
        } => Ok(client(&remote)?.add(&name, &users).await?),
        Command::Remove {
            name,
            users,
            remote,
        } => Ok(client(&remote)?.remove(&name, &users).await?),
        Command::List { remote } => {
            for acl in client(&remote)?.acls().await? {
                println!("{acl}");
            }
            Ok(())
        }
        Command::Config { action } => handle_config_command(config_path, action),
    }
}

// ============================================================================
// Server
// ============================================================================

/// Build the server from `config` and serve until `shutdown` resolves.
pub async fn serve<F>(config: AclstoreConfig, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let server = build_server(&config).await?;
    server.serve_with_shutdown(shutdown).await?;
    Ok(())
}

/// Open the backend, bootstrap the admin and declared ACLs, and wire the
/// authenticator into a [`Server`].
pub async fn build_server(config: &AclstoreConfig) -> Result<Server> {
    let kv = open_backend(config).await?;
    let manager = Manager::new(ManagerParams {
        store: Arc::new(KvAclStore::new(kv)),
        initial_admin_users: config.admin_users.clone(),
    })
    .await?;
    for acl in &config.acls {
        if manager.create_acl(&acl.name, &acl.users).await? == CreateOutcome::AlreadyExists {
            log::debug!("Declared ACL '{}' already exists", acl.name);
        }
    }

    if config.auth.tokens.is_empty() {
        log::warn!("No auth tokens configured; every request will be rejected");
    }
    let validator = StaticTokenValidator::new(config.auth.tokens.clone());
    let authenticator = BearerAuthenticator::new(
        Arc::new(validator),
        AuthConfig {
            realm: config.auth.realm.clone(),
        },
    );

    Ok(Server::new(
        ServerConfig {
            listen: config.server.listen,
            root_path: config.server.root_path.clone(),
        },
        Arc::new(manager),
        Arc::new(authenticator),
    )?)
}

async fn open_backend(config: &AclstoreConfig) -> Result<Arc<dyn KvStore>> {
    match config.backend.kind {
        BackendKind::Memory => {
            log::warn!("Using the in-memory backend; ACLs are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        BackendKind::Redis => {
            let url = config
                .backend
                .url
                .as_deref()
                .ok_or_else(|| Error::config("backend.url is required for the redis backend"))?;
            let store = RedisStore::connect(url, config.backend.key_prefix.clone()).await?;
            log::info!("Connected to redis backend");
            Ok(Arc::new(store))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}

// ============================================================================
// Client
// ============================================================================

fn client(remote: &RemoteArgs) -> Result<AclClient> {
    let client = AclClient::new(&remote.url)?;
    Ok(match &remote.token {
        Some(token) => client.with_bearer_token(token.clone()),
        None => client,
    })
}

// ============================================================================
// Config
// ============================================================================

/// Handle a config subcommand.
pub fn handle_config_command(config_path: Option<&Path>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Init { file, force } => {
            let path = match file {
                Some(p) => p,
                None => AclstoreConfig::default_config_path()
                    .ok_or_else(|| Error::config("Could not determine config directory"))?,
            };
            cmd_config_init(&path, force)
        }
        ConfigAction::Show => {
            let mut config = AclstoreConfig::load(config_path)?;
            for entry in &mut config.auth.tokens {
                entry.token = "<redacted>".to_string();
            }
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

/// Show the resolved config file path.
pub fn cmd_config_path(config_path: Option<&Path>) -> Result<()> {
    let path = AclstoreConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(file does not exist; run `aclstore config init` to create it)");
    }
    Ok(())
}

/// Write a default configuration file to `path`.
pub fn cmd_config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    let toml_str = AclstoreConfig::default().to_toml_string()?;
    std::fs::write(path, toml_str).map_err(|e| Error::io_with_path(e, path))?;
    println!("Config file created at {}", path.display());
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
