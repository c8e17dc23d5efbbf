//! The response envelope returned by the `ask` tool.
//!
//! Two shapes exist:
//!
//! ```text
//! {"query": ..., "unity_results": [...] | null, "glue_results": [...] | null, "summary": ...}
//! {"query": ..., "clarification_needed": true, "clarification_question": ...}
//! ```

use crate::error::CatalogError;
use crate::models::{TableDescriptor, TableMatch};
use serde::Serialize;

/// Error details reported in place of a catalog's results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Machine-readable code (e.g., `catalog_unavailable`)
    pub error: String,
    pub error_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl From<&CatalogError> for ErrorReport {
    fn from(err: &CatalogError) -> Self {
        Self {
            error: err.code().to_string(),
            error_message: err.to_string(),
            suggestion: err.suggestion().map(String::from),
        }
    }
}

/// What one catalog contributed to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CatalogResults {
    /// Database or table names
    Names(Vec<String>),
    Matches(Vec<TableMatch>),
    Table(Box<TableDescriptor>),
    Error(ErrorReport),
}

impl CatalogResults {
    /// Number of items found, or `None` when the catalog reported an error.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Names(names) => Some(names.len()),
            Self::Matches(matches) => Some(matches.len()),
            Self::Table(_) => Some(1),
            Self::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl<T> From<Result<T, CatalogError>> for CatalogResults
where
    T: Into<CatalogResults>,
{
    fn from(result: Result<T, CatalogError>) -> Self {
        match result {
            Ok(value) => value.into(),
            Err(err) => Self::Error(ErrorReport::from(&err)),
        }
    }
}

impl From<Vec<String>> for CatalogResults {
    fn from(names: Vec<String>) -> Self {
        Self::Names(names)
    }
}

impl From<Vec<TableMatch>> for CatalogResults {
    fn from(matches: Vec<TableMatch>) -> Self {
        Self::Matches(matches)
    }
}

impl From<TableDescriptor> for CatalogResults {
    fn from(table: TableDescriptor) -> Self {
        Self::Table(Box::new(table))
    }
}

/// Response envelope for a natural-language catalog question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AgentResponse {
    Answer {
        query: String,
        unity_results: Option<CatalogResults>,
        glue_results: Option<CatalogResults>,
        summary: String,
    },
    Clarification {
        query: String,
        clarification_needed: bool,
        clarification_question: String,
    },
}

impl AgentResponse {
    /// Build a clarification request.
    pub fn clarification(query: impl Into<String>, question: impl Into<String>) -> Self {
        Self::Clarification {
            query: query.into(),
            clarification_needed: true,
            clarification_question: question.into(),
        }
    }

    pub fn query(&self) -> &str {
        match self {
            Self::Answer { query, .. } | Self::Clarification { query, .. } => query,
        }
    }

    pub fn needs_clarification(&self) -> bool {
        matches!(self, Self::Clarification { .. })
    }
}
