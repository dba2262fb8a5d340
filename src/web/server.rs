//! Web server for classhub.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::auth::AccessTokenVerifier;
use crate::config::{Config, ServerConfig, StorageBackend, StorageConfig};
use crate::storage::MediaStore;
use crate::{ClassHubError, Database, Result};

use super::handlers::AppState;
use super::middleware::RateLimitState;
use super::router::{create_media_router, create_router, media_mount_path};

/// Web server for the API.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    verifier: Arc<AccessTokenVerifier>,
    rate_limit: Arc<RateLimitState>,
    server_config: ServerConfig,
    storage_config: StorageConfig,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, db: Arc<Database>, media_store: Arc<dyn MediaStore>) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| ClassHubError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(db, config, media_store)),
            verifier: Arc::new(AccessTokenVerifier::new(&config.auth.access_token_secret)),
            rate_limit: Arc::new(
                RateLimitState::new(config.server.login_rate_limit)
                    .with_trusted_proxy_headers(config.server.trust_proxy_headers),
            ),
            server_config: config.server.clone(),
            storage_config: config.storage.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn into_router(self) -> (Router, Arc<RateLimitState>) {
        let rate_limit = self.rate_limit.clone();
        let mut router = create_router(
            self.app_state,
            self.verifier,
            self.rate_limit,
            &self.server_config.cors_origins,
        );

        if self.storage_config.backend == StorageBackend::Local {
            let local = &self.storage_config.local;
            match media_mount_path(&local.public_base_url) {
                Some(mount) => {
                    tracing::info!(mount = %mount, dir = %local.path, "Serving local media");
                    router = router.merge(create_media_router(&mount, std::path::Path::new(&local.path)));
                }
                None => tracing::warn!(
                    url = %local.public_base_url,
                    "Local media base URL has no mountable path; media is not served"
                ),
            }
        }

        (router.layer(CompressionLayer::new()), rate_limit)
    }

    async fn bind(self) -> std::io::Result<(TcpListener, Router)> {
        let addr = self.addr;
        let media_store = self.app_state.media_store.name();
        let (router, rate_limit) = self.into_router();

        let listener = TcpListener::bind(addr).await?;
        rate_limit.start_cleanup_task();

        tracing::info!(
            media_store,
            "Web server listening on http://{}",
            listener.local_addr()?
        );
        Ok((listener, router))
    }

    /// Run the web server until it fails.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.bind().await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }

    /// Run the server in the background and return the bound address.
    ///
    /// Useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!(error = %e, "Web server error");
            }
        });

        Ok(local_addr)
    }
}
