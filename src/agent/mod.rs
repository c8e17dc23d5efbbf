//! Natural-language routing for catalog questions.
//!
//! A question is turned into a [`ParsedQuery`] (one intent from a closed set
//! plus the catalogs to ask) by an [`IntentExtractor`], then executed by the
//! [`CatalogRouter`] against the selected adapters.
//!
//! - `keyword`: deterministic rules, no network
//! - `llm`: hosted model call returning a JSON intent, with keyword fallback
//! - `router`: dispatch and response envelope construction

pub mod keyword;
pub mod llm;
pub mod router;

pub use keyword::KeywordExtractor;
pub use llm::{HostedModelConfig, HostedModelExtractor};
pub use router::CatalogRouter;

use crate::error::CatalogResult;
use crate::models::CatalogKind;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What the user asked for, with the slots each operation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ListDatabases,
    ListTables { database: String },
    TableDetails { database: String, table: String },
    SearchByName { pattern: String },
    SearchByColumn { pattern: String },
    /// Not enough information to act; ask the user this question.
    Ambiguous { question: String },
}

impl Intent {
    /// Short description used in summaries and logs.
    pub fn describe(&self) -> String {
        match self {
            Self::ListDatabases => "databases".to_string(),
            Self::ListTables { database } => format!("tables in '{}'", database),
            Self::TableDetails { database, table } => {
                format!("details of '{}.{}'", database, table)
            }
            Self::SearchByName { pattern } => format!("tables named like '{}'", pattern),
            Self::SearchByColumn { pattern } => {
                format!("tables with columns like '{}'", pattern)
            }
            Self::Ambiguous { .. } => "clarification".to_string(),
        }
    }
}

/// Which catalogs a question should be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CatalogTarget {
    Unity,
    Glue,
    #[default]
    Both,
}

impl CatalogTarget {
    pub fn includes(&self, kind: CatalogKind) -> bool {
        matches!(
            (self, kind),
            (Self::Both, _) | (Self::Unity, CatalogKind::Unity) | (Self::Glue, CatalogKind::Glue)
        )
    }
}

/// An extracted intent and its target catalogs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub intent: Intent,
    pub target: CatalogTarget,
}

impl ParsedQuery {
    pub fn new(intent: Intent, target: CatalogTarget) -> Self {
        Self { intent, target }
    }
}

/// Turns a natural-language question into a [`ParsedQuery`].
#[async_trait]
pub trait IntentExtractor: Send + Sync {
    /// Name for logs.
    fn name(&self) -> &'static str;

    async fn extract(&self, query: &str) -> CatalogResult<ParsedQuery>;
}
