//! Intent dispatch and response envelope construction.

use super::{CatalogTarget, Intent, IntentExtractor, ParsedQuery};
use crate::catalog::CatalogAdapter;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{AgentResponse, CatalogKind, CatalogResults};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Routes natural-language questions to the catalog adapters.
#[derive(Clone)]
pub struct CatalogRouter {
    unity: Arc<dyn CatalogAdapter>,
    glue: Arc<dyn CatalogAdapter>,
    extractor: Arc<dyn IntentExtractor>,
}

impl CatalogRouter {
    pub fn new(
        unity: Arc<dyn CatalogAdapter>,
        glue: Arc<dyn CatalogAdapter>,
        extractor: Arc<dyn IntentExtractor>,
    ) -> Self {
        Self {
            unity,
            glue,
            extractor,
        }
    }

    /// Answer a question with the response envelope.
    ///
    /// Catalog failures are reported inside the envelope; only an empty
    /// question or an extractor failure is an error.
    pub async fn answer(&self, query: &str) -> CatalogResult<AgentResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CatalogError::invalid_input("query must not be empty"));
        }

        let parsed = self.extractor.extract(query).await?;
        info!(
            extractor = self.extractor.name(),
            intent = ?parsed.intent,
            target = ?parsed.target,
            "Routing question"
        );
        Ok(self.execute(query, parsed).await)
    }

    /// Run an already-parsed question.
    pub async fn execute(&self, query: &str, parsed: ParsedQuery) -> AgentResponse {
        if let Intent::Ambiguous { question } = parsed.intent {
            return AgentResponse::clarification(query, question);
        }

        let target = resolve_target(&parsed);
        let mut unity_results = None;
        let mut glue_results = None;
        for adapter in [&self.unity, &self.glue] {
            let kind = adapter.kind();
            if !target.includes(kind) {
                continue;
            }
            let results = dispatch(adapter.as_ref(), &parsed.intent).await;
            if results.is_error() {
                warn!(catalog = %kind, intent = %parsed.intent.describe(), "Catalog returned an error");
            } else {
                debug!(catalog = %kind, count = ?results.len(), "Catalog answered");
            }
            match kind {
                CatalogKind::Unity => unity_results = Some(results),
                CatalogKind::Glue => glue_results = Some(results),
            }
        }

        let summary = summarize(&parsed.intent, unity_results.as_ref(), glue_results.as_ref());
        AgentResponse::Answer {
            query: query.to_string(),
            unity_results,
            glue_results,
            summary,
        }
    }
}

/// Narrow a `Both` target for operations addressed to one database.
///
/// Unity databases are dotted `catalog.schema` pairs and Glue databases are
/// plain names, so the identifier shape picks the catalog.
fn resolve_target(parsed: &ParsedQuery) -> CatalogTarget {
    let database = match &parsed.intent {
        Intent::ListTables { database } | Intent::TableDetails { database, .. } => database,
        _ => return parsed.target,
    };
    match parsed.target {
        CatalogTarget::Both if database.contains('.') => CatalogTarget::Unity,
        CatalogTarget::Both => CatalogTarget::Glue,
        target => target,
    }
}

async fn dispatch(adapter: &dyn CatalogAdapter, intent: &Intent) -> CatalogResults {
    match intent {
        Intent::ListDatabases => adapter.list_databases().await.into(),
        Intent::ListTables { database } => adapter.list_tables(database).await.into(),
        Intent::TableDetails { database, table } => {
            adapter.get_table_details(database, table).await.into()
        }
        Intent::SearchByName { pattern } => adapter.search_tables_by_name(pattern).await.into(),
        Intent::SearchByColumn { pattern } => {
            adapter.search_tables_by_column(pattern).await.into()
        }
        Intent::Ambiguous { .. } => {
            CatalogResults::from(Err::<Vec<String>, _>(CatalogError::internal(
                "ambiguous intents are not dispatched",
            )))
        }
    }
}

/// One sentence per queried catalog.
fn summarize(
    intent: &Intent,
    unity: Option<&CatalogResults>,
    glue: Option<&CatalogResults>,
) -> String {
    let subject = intent.describe();
    [(CatalogKind::Unity, unity), (CatalogKind::Glue, glue)]
        .into_iter()
        .filter_map(|(kind, results)| results.map(|r| (kind, r)))
        .map(|(kind, results)| match results {
            CatalogResults::Error(report) => format!(
                "The {} could not be queried for {}: {}.",
                kind, subject, report.error_message
            ),
            CatalogResults::Table(table) => format!(
                "The {} describes {}.{} with {} column{}.",
                kind,
                table.database,
                table.name,
                table.columns.len(),
                plural(table.columns.len())
            ),
            other => {
                let count = other.len().unwrap_or_default();
                format!(
                    "The {} returned {} result{} for {}.",
                    kind,
                    count,
                    plural(count),
                    subject
                )
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
