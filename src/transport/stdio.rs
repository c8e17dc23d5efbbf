//! Stdio transport for the MCP server.
//!
//! Reads JSON-RPC messages from stdin and writes responses to stdout, so
//! nothing else may write to stdout while it runs.

use crate::error::{CatalogError, CatalogResult};
use crate::mcp::CatalogService;
use crate::transport::{Transport, wait_for_signal};
use rmcp::{ServiceExt, transport::stdio};
use tracing::{info, warn};

pub struct StdioTransport {
    service: CatalogService,
}

impl StdioTransport {
    pub fn new(service: CatalogService) -> Self {
        Self { service }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> CatalogResult<()> {
        info!("Starting MCP server with stdio transport");

        let running_service = self
            .service
            .clone()
            .serve(stdio())
            .await
            .map_err(|e| CatalogError::internal(format!("Failed to start stdio transport: {}", e)))?;

        tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(reason) => {
                        info!(reason = ?reason, "Stdio transport completed");
                        Ok(())
                    }
                    Err(e) => {
                        warn!(error = %e, "Stdio transport error");
                        Err(CatalogError::internal(format!("Stdio transport error: {}", e)))
                    }
                }
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received");
                // A blocking stdin read cannot be cancelled; leave the process directly.
                std::process::exit(0)
            }
        }
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}
