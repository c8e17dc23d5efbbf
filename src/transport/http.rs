//! Streamable HTTP transport for the MCP server.
//!
//! Each MCP session gets its own clone of the [`CatalogService`]; clones
//! share the catalog adapters. When auth tokens are configured every request
//! must carry one of them as a bearer token.

use crate::auth::{AuthConfig, auth_middleware};
use crate::error::{CatalogError, CatalogResult};
use crate::mcp::CatalogService;
use crate::transport::{Transport, wait_for_signal};
use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Open SSE streams can keep the server alive; stop waiting after this.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpTransport {
    service: CatalogService,
    host: String,
    port: u16,
    /// MCP endpoint path
    endpoint: String,
    auth: Arc<AuthConfig>,
}

impl HttpTransport {
    /// Create an HTTP transport without authentication.
    pub fn new(
        service: CatalogService,
        host: impl Into<String>,
        port: u16,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            service,
            host: host.into(),
            port,
            endpoint: endpoint.into(),
            auth: Arc::new(AuthConfig::disabled()),
        }
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Arc::new(auth);
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth.is_enabled()
    }

    /// Build the axum app serving MCP at the configured endpoint.
    pub fn router(&self) -> Router {
        let service = self.service.clone();
        let mcp = StreamableHttpService::new(
            move || Ok(service.clone()),
            LocalSessionManager::default().into(),
            Default::default(),
        );

        // nest_service rejects "/", so the root endpoint uses the fallback.
        let app = if self.endpoint == "/" {
            Router::new().fallback_service(mcp)
        } else {
            Router::new().nest_service(&self.endpoint, mcp)
        };

        if self.auth.is_enabled() {
            app.layer(axum::middleware::from_fn_with_state(
                self.auth.clone(),
                auth_middleware,
            ))
        } else {
            app
        }
    }
}

impl Transport for HttpTransport {
    async fn run(&self) -> CatalogResult<()> {
        let bind_addr = self.bind_addr();
        info!(
            addr = %bind_addr,
            auth = self.auth.is_enabled(),
            "Starting MCP server with HTTP transport"
        );

        let app = self.router();
        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            CatalogError::unavailable(
                format!("Failed to bind to {}: {}", bind_addr, e),
                "Check that the port is available",
            )
        })?;

        info!(endpoint = %self.endpoint, "MCP endpoint ready");

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let notify = shutdown_notify.clone();
        let shutdown_signal = async move {
            wait_for_signal().await;
            notify.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        tokio::select! {
            result = server => {
                match result {
                    Ok(()) => info!("HTTP server stopped"),
                    Err(e) => {
                        error!(error = %e, "HTTP server error");
                        return Err(CatalogError::internal(format!("HTTP server error: {}", e)));
                    }
                }
            }
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Waiting for connections to close (send signal again to force exit)..."
                );
                tokio::select! {
                    _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => {}
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
