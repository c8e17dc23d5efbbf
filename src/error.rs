//! Error types for the Catalog MCP Server.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Each error variant provides actionable messages to help AI assistants understand
//! and recover from error conditions.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid database identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Not found: {object} ({message})")]
    NotFound { object: String, message: String },

    #[error("Catalog unavailable: {message}")]
    Unavailable { message: String, suggestion: String },

    #[error("Catalog error: {message}")]
    Catalog { message: String, suggestion: String },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u64,
    },

    #[error("Model error: {message}")]
    Model { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CatalogError {
    /// Create an invalid identifier error for a three-level database name.
    pub fn invalid_identifier(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            object: object.into(),
            message: message.into(),
        }
    }

    /// Create a catalog unavailable error with a helpful suggestion.
    pub fn unavailable(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a generic catalog error with a helpful suggestion.
    pub fn catalog(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    /// Create a hosted model error.
    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable code, used in per-catalog error reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => "invalid_identifier",
            Self::InvalidInput { .. } => "invalid_input",
            Self::NotFound { .. } => "not_found",
            Self::Unavailable { .. } => "catalog_unavailable",
            Self::Catalog { .. } => "catalog_error",
            Self::Timeout { .. } => "timeout",
            Self::Model { .. } => "model_error",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::InvalidIdentifier { .. } => {
                Some("Provide the database name in the format 'catalog_name.schema_name'")
            }
            Self::Unavailable { suggestion, .. } => Some(suggestion),
            Self::Catalog { suggestion, .. } => Some(suggestion),
            Self::NotFound { .. } => {
                Some("List the databases and tables first to confirm the exact names")
            }
            _ => None,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}

/// Convert reqwest errors to CatalogError.
///
/// Anything that prevented the exchange from completing is `Unavailable`;
/// a completed exchange with an unreadable body is a `Catalog` error.
impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CatalogError::unavailable(
                format!("Request timed out: {}", err),
                "Check that the catalog service is healthy and responding",
            )
        } else if err.is_connect() || err.is_request() {
            CatalogError::unavailable(
                format!("Failed to connect to catalog service: {}", err),
                "Please ensure the catalog service is running and reachable",
            )
        } else if err.is_decode() {
            CatalogError::catalog(
                format!("Failed to decode catalog response: {}", err),
                "Check that the configured URL points at a compatible catalog API",
            )
        } else {
            CatalogError::catalog(
                format!("Unexpected error talking to catalog service: {}", err),
                "Please check the catalog service configuration",
            )
        }
    }
}

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Build suggestion data as JSON value.
fn suggestion_data(suggestion: Option<&str>) -> Option<serde_json::Value> {
    suggestion.map(|s| serde_json::json!({ "suggestion": s }))
}

/// Convert CatalogError to MCP ErrorData for semantic error categorization.
/// Includes the suggestion field in the `data` object when available.
impl From<CatalogError> for rmcp::ErrorData {
    fn from(err: CatalogError) -> Self {
        let data = suggestion_data(err.suggestion());
        match &err {
            CatalogError::InvalidIdentifier { .. } | CatalogError::InvalidInput { .. } => {
                rmcp::ErrorData::invalid_params(err.to_string(), data)
            }

            CatalogError::NotFound { .. } => {
                rmcp::ErrorData::resource_not_found(err.to_string(), data)
            }

            CatalogError::Unavailable { .. }
            | CatalogError::Catalog { .. }
            | CatalogError::Timeout { .. }
            | CatalogError::Model { .. }
            | CatalogError::Internal { .. } => rmcp::ErrorData::internal_error(err.to_string(), data),
        }
    }
}
