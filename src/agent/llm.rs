//! Intent extraction through a hosted model (Anthropic Messages API).
//!
//! The model is asked for a single JSON object describing the intent; it is
//! never given tools or asked to write the answer. Any failure (network,
//! HTTP status, unparseable reply) falls back to the keyword rules, so the
//! `ask` tool keeps working without the model.

use super::keyword::{KeywordExtractor, detect_target};
use super::{CatalogTarget, Intent, IntentExtractor, ParsedQuery};
use crate::error::{CatalogError, CatalogResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "claude-3-7-sonnet-latest";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 256;

const SYSTEM_PROMPT: &str = r#"You classify questions about data catalogs.
Two catalogs exist: Unity (three-level names: catalog.schema.table; a database is "catalog.schema")
and AWS Glue (two-level names: database.table).

Reply with ONE JSON object and nothing else:
{"intent": "list_databases" | "list_tables" | "table_details" | "search_by_name" | "search_by_column" | "ambiguous",
 "target": "unity" | "glue" | "both",
 "database": string or null,
 "table": string or null,
 "pattern": string or null,
 "question": string or null}

Rules:
- target is "unity" if the user mentions Unity or Databricks, "glue" if they mention Glue or AWS, otherwise "both".
- list_tables needs "database"; table_details needs "database" and "table"; searches need "pattern".
- If a required value is missing or the request is unclear, use "ambiguous" and put a short clarifying question in "question"."#;

/// Hosted model connection settings.
#[derive(Clone)]
pub struct HostedModelConfig {
    pub api_key: String,
    pub model: String,
    /// API base, e.g. `https://api.anthropic.com/v1`
    pub base_url: Url,
    pub timeout: Duration,
}

impl std::fmt::Debug for HostedModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedModelConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum IntentKind {
    ListDatabases,
    ListTables,
    TableDetails,
    SearchByName,
    SearchByColumn,
    Ambiguous,
}

/// The JSON object the model is asked to produce.
#[derive(Debug, Deserialize)]
struct IntentReply {
    intent: IntentKind,
    #[serde(default)]
    target: Option<CatalogTarget>,
    #[serde(default)]
    database: Option<String>,
    #[serde(default)]
    table: Option<String>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    question: Option<String>,
}

impl IntentReply {
    /// Convert to a [`ParsedQuery`]; a missing required slot becomes a clarification.
    fn into_parsed(self, query: &str) -> ParsedQuery {
        let slot = |value: Option<String>| value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let ask = |question: &str| Intent::Ambiguous {
            question: question.to_string(),
        };

        let intent = match self.intent {
            IntentKind::ListDatabases => Intent::ListDatabases,
            IntentKind::ListTables => match slot(self.database) {
                Some(database) => Intent::ListTables { database },
                None => ask("Which database should I list tables from?"),
            },
            IntentKind::TableDetails => match (slot(self.database), slot(self.table)) {
                (Some(database), Some(table)) => Intent::TableDetails { database, table },
                _ => ask("Which table would you like details for, and in which database?"),
            },
            IntentKind::SearchByName => match slot(self.pattern) {
                Some(pattern) => Intent::SearchByName { pattern },
                None => ask("What table name should I search for?"),
            },
            IntentKind::SearchByColumn => match slot(self.pattern) {
                Some(pattern) => Intent::SearchByColumn { pattern },
                None => ask("What column name should I search for?"),
            },
            IntentKind::Ambiguous => Intent::Ambiguous {
                question: slot(self.question)
                    .unwrap_or_else(|| "Could you rephrase your question?".to_string()),
            },
        };

        ParsedQuery::new(intent, self.target.unwrap_or_else(|| detect_target(query)))
    }
}

/// Parse the model's reply text: the JSON object between the first `{` and the last `}`.
fn parse_reply(text: &str) -> CatalogResult<IntentReply> {
    let json = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            return Err(CatalogError::model(format!(
                "Reply contains no JSON object: {}",
                text.trim()
            )));
        }
    };
    serde_json::from_str(json)
        .map_err(|e| CatalogError::model(format!("Unrecognized intent reply: {}", e)))
}

/// Hosted-model intent extractor with keyword fallback.
pub struct HostedModelExtractor {
    client: Client,
    config: HostedModelConfig,
    endpoint: Url,
    fallback: KeywordExtractor,
}

impl HostedModelExtractor {
    pub fn new(config: HostedModelConfig) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::internal(format!("Failed to create HTTP client: {}", e)))?;
        let mut endpoint = config.base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| CatalogError::invalid_input("llm-base-url cannot be a base URL"))?
            .pop_if_empty()
            .push("messages");
        Ok(Self {
            client,
            config,
            endpoint,
            fallback: KeywordExtractor::new(),
        })
    }

    /// One model round trip, without fallback.
    async fn ask_model(&self, query: &str) -> CatalogResult<ParsedQuery> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: MAX_TOKENS,
            system: SYSTEM_PROMPT,
            messages: [Message {
                role: "user",
                content: query,
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| CatalogError::model(format!("Model request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| format!("{}: {}", b.error.kind, b.error.message))
                .unwrap_or(body);
            return Err(CatalogError::model(format!("Model returned {}: {}", status, detail)));
        }

        let reply: MessagesResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::model(format!("Unreadable model response: {}", e)))?;
        let text: String = reply
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        let parsed = parse_reply(&text)?.into_parsed(query);
        debug!(intent = ?parsed.intent, target = ?parsed.target, "Model extracted intent");
        Ok(parsed)
    }
}

#[async_trait]
impl IntentExtractor for HostedModelExtractor {
    fn name(&self) -> &'static str {
        "hosted-model"
    }

    async fn extract(&self, query: &str) -> CatalogResult<ParsedQuery> {
        match self.ask_model(query).await {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                warn!(error = %e, "Hosted model unavailable, using keyword rules");
                Ok(self.fallback.parse(query))
            }
        }
    }
}
