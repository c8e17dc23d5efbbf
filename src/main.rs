//! Catalog MCP Server - Main entry point.
//!
//! Serves MCP tools that let AI assistants browse and search the Unity
//! catalog and the AWS Glue Data Catalog.

use catalog_mcp_server::agent::{
    CatalogRouter, HostedModelExtractor, IntentExtractor, KeywordExtractor,
};
use catalog_mcp_server::auth::AuthConfig;
use catalog_mcp_server::catalog::{CatalogAdapter, GlueCatalog, UnityCatalog};
use catalog_mcp_server::config::{Config, TransportMode};
use catalog_mcp_server::readiness::wait_for_catalogs;
use catalog_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use catalog_mcp_server::CatalogService;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber. Logs go to stderr; stdout belongs to
/// the stdio transport.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Print a configuration error and exit.
fn exit_with(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    eprintln!();
    eprintln!("Run 'catalog-mcp-server --help' for the available options.");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse_args();

    // Under stdio, logs stay off unless asked for.
    if config.transport == TransportMode::Http || config.enable_logs {
        init_tracing(&config);
    }

    info!(
        transport = %config.transport,
        "Starting Catalog MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let unity_config = config.unity().unwrap_or_else(|e| exit_with(e));
    let glue_config = config.glue().unwrap_or_else(|e| exit_with(e));
    let hosted_model = config.hosted_model().unwrap_or_else(|e| exit_with(e));
    let auth = AuthConfig::from_tokens(&config.auth_tokens).unwrap_or_else(|e| exit_with(e));

    info!(
        unity_url = %unity_config.base_url,
        glue_region = %glue_config.region,
        glue_signed = glue_config.credentials.is_some(),
        "Configured catalogs"
    );
    if glue_config.credentials.is_none() {
        warn!("No AWS credentials configured, Glue requests are sent unsigned");
    }

    let unity: Arc<dyn CatalogAdapter> = Arc::new(UnityCatalog::new(unity_config)?);
    let glue: Arc<dyn CatalogAdapter> = Arc::new(GlueCatalog::new(glue_config)?);

    if let Some(settings) = config.readiness() {
        info!(timeout_secs = settings.timeout.as_secs(), "Waiting for catalogs");
        wait_for_catalogs(&[unity.as_ref(), glue.as_ref()], settings).await?;
        info!("Catalogs ready");
    }

    let extractor: Arc<dyn IntentExtractor> = match hosted_model {
        Some(model) => {
            info!(model = %model.model, "Using hosted model for ask");
            Arc::new(HostedModelExtractor::new(model)?)
        }
        None => {
            info!("No model API key, ask uses keyword rules");
            Arc::new(KeywordExtractor::new())
        }
    };

    let router = CatalogRouter::new(unity.clone(), glue.clone(), extractor);
    let service = CatalogService::new(unity, glue, router);

    let result = match config.transport {
        TransportMode::Stdio => StdioTransport::new(service).run().await,
        TransportMode::Http => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                auth_tokens = auth.token_count(),
                "Using HTTP transport"
            );
            HttpTransport::new(
                service,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            )
            .with_auth(auth)
            .run()
            .await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
