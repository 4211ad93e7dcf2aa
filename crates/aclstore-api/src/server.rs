//! API server implementation

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use aclstore::Manager;
use aclstore_auth::Authenticator;
use axum::Router;
use tokio::net::TcpListener;

use crate::routes::{AppState, router};
use crate::{Error, Result};

/// Server settings.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to listen on.
    pub listen: SocketAddr,
    /// URL prefix under which ACLs are served. Empty serves at `/`.
    pub root_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            root_path: String::new(),
        }
    }
}

/// ACL administration server
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    /// Create a new server instance
    pub fn new(
        config: ServerConfig,
        manager: Arc<Manager>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Result<Self> {
        if !config.root_path.is_empty() && !config.root_path.starts_with('/') {
            return Err(Error::InvalidRootPath(config.root_path));
        }
        Ok(Self {
            config,
            state: AppState {
                manager,
                authenticator,
            },
        })
    }

    /// The configured settings.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The router serving this server's routes.
    pub fn router(&self) -> Router {
        router(&self.config.root_path, self.state.clone())
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.listen).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        log::info!(
            "Serving ACLs on http://{addr}{}/",
            self.config.root_path.trim_end_matches('/')
        );
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        log::info!("Server stopped");
        Ok(())
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
