//! Configuration handling for the Catalog MCP Server.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use crate::agent::llm::{DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, HostedModelConfig};
use crate::catalog::glue::DEFAULT_GLUE_REGION;
use crate::catalog::unity::DEFAULT_UNITY_URL;
use crate::catalog::{AwsCredentials, GlueConfig, UnityConfig};
use crate::readiness::{DEFAULT_POLL_INTERVAL_SECS, PollSettings};
use clap::{Parser, ValueEnum};
use std::time::Duration;
use url::Url;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8000;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";
pub const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// HTTP with Server-Sent Events (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Configuration for the Catalog MCP Server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "catalog-mcp-server",
    about = "MCP server for data catalog discovery - lets AI assistants browse Unity Catalog and AWS Glue metadata",
    version,
    author
)]
pub struct Config {
    /// Unity Catalog REST API base URL
    #[arg(
        long,
        value_name = "URL",
        default_value = DEFAULT_UNITY_URL,
        env = "UNITY_CATALOG_URL"
    )]
    pub unity_url: String,

    /// AWS region of the Glue Data Catalog
    #[arg(long, default_value = DEFAULT_GLUE_REGION, env = "AWS_REGION")]
    pub glue_region: String,

    /// Override the Glue endpoint (e.g., a local emulator)
    #[arg(long, value_name = "URL", env = "GLUE_ENDPOINT_URL")]
    pub glue_endpoint: Option<String>,

    /// AWS access key id for signing Glue requests
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub aws_access_key_id: Option<String>,

    /// AWS secret access key for signing Glue requests
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub aws_secret_access_key: Option<String>,

    /// AWS session token for temporary credentials
    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    pub aws_session_token: Option<String>,

    /// Per-request timeout for catalog calls in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CATALOG_TIMEOUT_SECS,
        env = "MCP_CATALOG_TIMEOUT"
    )]
    pub catalog_timeout: u64,

    /// API key for the hosted model used by the `ask` tool.
    /// Without it, questions are routed with keyword rules only.
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// Hosted model name
    #[arg(long, default_value = DEFAULT_LLM_MODEL, env = "MCP_LLM_MODEL")]
    pub llm_model: String,

    /// Hosted model API base URL
    #[arg(
        long,
        value_name = "URL",
        default_value = DEFAULT_LLM_BASE_URL,
        env = "MCP_LLM_BASE_URL"
    )]
    pub llm_base_url: String,

    /// Hosted model request timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_LLM_TIMEOUT_SECS,
        env = "MCP_LLM_TIMEOUT"
    )]
    pub llm_timeout: u64,

    /// Wait up to this many seconds for both catalogs to respond before serving.
    /// 0 disables the check.
    #[arg(long, value_name = "SECS", default_value_t = 0, env = "MCP_WAIT_READY")]
    pub wait_ready: u64,

    /// Seconds between readiness probes
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = DEFAULT_POLL_INTERVAL_SECS,
        env = "MCP_READY_POLL_INTERVAL"
    )]
    pub ready_poll_interval: u64,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_HTTP_HOST,
        env = "MCP_HTTP_HOST"
    )]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(
        long,
        default_value_t = DEFAULT_HTTP_PORT,
        env = "MCP_HTTP_PORT"
    )]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_MCP_ENDPOINT,
        env = "MCP_ENDPOINT"
    )]
    pub mcp_endpoint: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,

    /// Enable logging output (disabled by default to avoid interfering with stdio transport)
    #[arg(long, env = "MCP_ENABLE_LOGS")]
    pub enable_logs: bool,

    /// Authentication tokens for HTTP transport.
    /// Can be specified multiple times or as comma-separated values.
    /// When set, all HTTP requests must include a valid Bearer token.
    #[arg(
        long = "auth-token",
        value_name = "TOKEN",
        env = "MCP_AUTH_TOKENS",
        value_delimiter = ','
    )]
    pub auth_tokens: Vec<String>,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            unity_url: DEFAULT_UNITY_URL.to_string(),
            glue_region: DEFAULT_GLUE_REGION.to_string(),
            glue_endpoint: None,
            aws_access_key_id: None,
            aws_secret_access_key: None,
            aws_session_token: None,
            catalog_timeout: DEFAULT_CATALOG_TIMEOUT_SECS,
            llm_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_timeout: DEFAULT_LLM_TIMEOUT_SECS,
            wait_ready: 0,
            ready_poll_interval: DEFAULT_POLL_INTERVAL_SECS,
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            enable_logs: false,
            auth_tokens: Vec::new(),
        }
    }

    /// Get the catalog request timeout as a Duration.
    pub fn catalog_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout)
    }

    /// Unity adapter settings.
    pub fn unity(&self) -> Result<UnityConfig, String> {
        let base_url = parse_http_url("unity-url", &self.unity_url)?;
        if self.serves_url(&base_url) {
            return Err(format!(
                "--unity-url '{}' points at this server's own HTTP address; change --http-port or --unity-url",
                self.unity_url
            ));
        }
        Ok(UnityConfig::new(base_url).with_timeout(self.catalog_timeout_duration()))
    }

    /// Whether `url` would be answered by our own HTTP listener.
    fn serves_url(&self, url: &Url) -> bool {
        if self.transport != TransportMode::Http
            || url.port_or_known_default() != Some(self.http_port)
        {
            return false;
        }
        let bind_host = self.http_host.trim();
        match url.host_str() {
            Some(host) if host.eq_ignore_ascii_case(bind_host) => true,
            Some(host) => {
                let local = |h: &str| {
                    matches!(h, "localhost" | "127.0.0.1" | "[::1]" | "::1" | "0.0.0.0")
                };
                local(host) && (local(bind_host) || bind_host == "::")
            }
            None => false,
        }
    }

    /// Glue adapter settings. Requests are signed only when both key parts are present.
    pub fn glue(&self) -> Result<GlueConfig, String> {
        if self.glue_region.trim().is_empty() {
            return Err("glue-region must not be empty".to_string());
        }
        let mut config =
            GlueConfig::new(self.glue_region.trim()).with_timeout(self.catalog_timeout_duration());
        if let Some(endpoint) = self.glue_endpoint.as_deref().filter(|s| !s.is_empty()) {
            config = config.with_endpoint(parse_http_url("glue-endpoint", endpoint)?);
        }
        match (
            non_empty(&self.aws_access_key_id),
            non_empty(&self.aws_secret_access_key),
        ) {
            (Some(key), Some(secret)) => {
                config = config.with_credentials(AwsCredentials::new(
                    key,
                    secret,
                    self.aws_session_token.clone(),
                ));
            }
            (None, None) => {}
            _ => {
                return Err(
                    "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together".to_string(),
                );
            }
        }
        Ok(config)
    }

    /// Hosted model settings, or `None` when no API key is configured.
    pub fn hosted_model(&self) -> Result<Option<HostedModelConfig>, String> {
        let Some(api_key) = non_empty(&self.llm_api_key) else {
            return Ok(None);
        };
        let base_url = parse_http_url("llm-base-url", &self.llm_base_url)?;
        Ok(Some(HostedModelConfig {
            api_key: api_key.to_string(),
            model: self.llm_model.clone(),
            base_url,
            timeout: Duration::from_secs(self.llm_timeout),
        }))
    }

    /// Readiness polling settings, or `None` when waiting is disabled.
    pub fn readiness(&self) -> Option<PollSettings> {
        (self.wait_ready > 0).then(|| {
            PollSettings::new(
                Duration::from_secs(self.ready_poll_interval.max(1)),
                Duration::from_secs(self.wait_ready),
            )
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_http_url(flag: &str, value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| format!("Invalid --{flag} '{value}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!(
            "Invalid --{flag} '{value}': unsupported scheme '{other}' (expected http or https)"
        )),
    }
}
