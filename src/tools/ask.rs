//! The `ask` tool: natural-language questions across both catalogs.

use crate::agent::CatalogRouter;
use crate::error::CatalogResult;
use crate::models::AgentResponse;
use schemars::JsonSchema;
use serde::Deserialize;

/// Input for the ask tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AskInput {
    /// Question about the data catalogs, e.g. "Which tables in glue have a customer column?"
    pub query: String,
}

pub struct AskToolHandler {
    router: CatalogRouter,
}

impl AskToolHandler {
    pub fn new(router: CatalogRouter) -> Self {
        Self { router }
    }

    pub async fn ask(&self, input: AskInput) -> CatalogResult<AgentResponse> {
        self.router.answer(&input.query).await
    }

    /// The response envelope as pretty-printed JSON text.
    pub async fn ask_json(&self, input: AskInput) -> CatalogResult<String> {
        let response = self.ask(input).await?;
        serde_json::to_string_pretty(&response).map_err(|e| {
            crate::error::CatalogError::internal(format!("Failed to encode response: {}", e))
        })
    }
}
