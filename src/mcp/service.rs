//! MCP service implementation using rmcp.
//!
//! This module defines the CatalogService struct with all catalog tools
//! exposed via the MCP protocol using the rmcp framework's macros.
//! Each browsing tool exists once per catalog (`*_unity_*` and `*_glue_*`).

use crate::agent::CatalogRouter;
use crate::catalog::CatalogAdapter;
use crate::tools::{
    AskInput, AskToolHandler, CatalogToolHandler, ListDatabasesOutput, ListTablesInput,
    ListTablesOutput, SearchByColumnInput, SearchByNameInput, SearchOutput, TableDetailsInput,
    TableDetailsOutput,
};
use rmcp::Json;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct CatalogService {
    /// Unity Catalog tools
    unity: CatalogToolHandler,
    /// AWS Glue tools
    glue: CatalogToolHandler,
    /// Natural-language routing for `ask`
    ask: Arc<AskToolHandler>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl CatalogService {
    /// Create a new CatalogService instance.
    ///
    /// # Arguments
    ///
    /// * `unity` - Adapter for the three-level Unity catalog
    /// * `glue` - Adapter for the two-level Glue catalog
    /// * `router` - Router used by the `ask` tool, normally over the same adapters
    pub fn new(
        unity: Arc<dyn CatalogAdapter>,
        glue: Arc<dyn CatalogAdapter>,
        router: CatalogRouter,
    ) -> Self {
        Self {
            unity: CatalogToolHandler::new(unity),
            glue: CatalogToolHandler::new(glue),
            ask: Arc::new(AskToolHandler::new(router)),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl CatalogService {
    #[tool(
        description = "List all databases in the Unity catalog.\nReturns 'catalog_name.schema_name' pairs; fails if any catalog cannot be listed."
    )]
    async fn list_unity_databases(&self) -> Result<Json<ListDatabasesOutput>, McpError> {
        self.unity
            .list_databases()
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "List all tables in a Unity database.\n`database_name` must be 'catalog_name.schema_name'."
    )]
    async fn list_unity_tables(
        &self,
        Parameters(input): Parameters<ListTablesInput>,
    ) -> Result<Json<ListTablesOutput>, McpError> {
        self.unity
            .list_tables(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Get details of a Unity table: description, columns, storage location and format.\n`database_name` must be 'catalog_name.schema_name'.\nOutput format: \"json\" returns structured data, \"table\" returns ASCII table, \"markdown\" returns markdown table."
    )]
    async fn get_unity_table_details(
        &self,
        Parameters(input): Parameters<TableDetailsInput>,
    ) -> Result<Json<TableDetailsOutput>, McpError> {
        self.unity
            .get_table_details(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Search for tables by name pattern in the Unity catalog (case-insensitive substring).\nWalks every catalog and schema; unreadable ones are skipped."
    )]
    async fn search_unity_tables_by_name(
        &self,
        Parameters(input): Parameters<SearchByNameInput>,
    ) -> Result<Json<SearchOutput>, McpError> {
        self.unity
            .search_by_name(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Search for tables containing columns matching the pattern in the Unity catalog (case-insensitive substring).\nReads every table's details, so this can be slow on large catalogs."
    )]
    async fn search_unity_tables_by_column(
        &self,
        Parameters(input): Parameters<SearchByColumnInput>,
    ) -> Result<Json<SearchOutput>, McpError> {
        self.unity
            .search_by_column(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(description = "List all databases in the AWS Glue catalog.")]
    async fn list_glue_databases(&self) -> Result<Json<ListDatabasesOutput>, McpError> {
        self.glue
            .list_databases()
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(description = "List all tables in an AWS Glue database.")]
    async fn list_glue_tables(
        &self,
        Parameters(input): Parameters<ListTablesInput>,
    ) -> Result<Json<ListTablesOutput>, McpError> {
        self.glue
            .list_tables(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Get details of an AWS Glue table: description, columns, storage location and format.\nOutput format: \"json\" returns structured data, \"table\" returns ASCII table, \"markdown\" returns markdown table."
    )]
    async fn get_glue_table_details(
        &self,
        Parameters(input): Parameters<TableDetailsInput>,
    ) -> Result<Json<TableDetailsOutput>, McpError> {
        self.glue
            .get_table_details(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Search for tables by name pattern in the AWS Glue catalog (case-insensitive substring)."
    )]
    async fn search_glue_tables_by_name(
        &self,
        Parameters(input): Parameters<SearchByNameInput>,
    ) -> Result<Json<SearchOutput>, McpError> {
        self.glue
            .search_by_name(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Search for tables containing columns matching the pattern in the AWS Glue catalog (case-insensitive substring)."
    )]
    async fn search_glue_tables_by_column(
        &self,
        Parameters(input): Parameters<SearchByColumnInput>,
    ) -> Result<Json<SearchOutput>, McpError> {
        self.glue
            .search_by_column(input)
            .await
            .map(Json)
            .map_err(McpError::from)
    }

    #[tool(
        description = "Ask a question about either or both catalogs in plain language.\nMention Unity/Databricks or Glue/AWS to pick a catalog; otherwise both are searched. Table listings and details go to one catalog picked by the database name: a dotted 'catalog.schema' means Unity, a plain name means Glue.\nReturns JSON: {query, unity_results, glue_results, summary}, or {query, clarification_needed, clarification_question} when the question is unclear."
    )]
    async fn ask(
        &self,
        Parameters(input): Parameters<AskInput>,
    ) -> Result<CallToolResult, McpError> {
        let json = self.ask.ask_json(input).await.map_err(McpError::from)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for CatalogService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "catalog-mcp-server".to_owned(),
                title: Some("Catalog MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tools for finding data products in the Unity catalog and the AWS Glue catalog.\n\
                \n\
                ## Namespaces\n\
                - **Unity**: three levels (catalog.schema.table). A database is 'catalog_name.schema_name'.\n\
                - **Glue**: two levels (database.table). A database is a plain name.\n\
                \n\
                ## Workflow\n\
                1. Call `list_unity_databases` / `list_glue_databases` to discover databases\n\
                2. Call `list_*_tables` with a database from step 1\n\
                3. Call `get_*_table_details` for columns, location and format\n\
                4. Or use `search_*_tables_by_name` / `search_*_tables_by_column` directly\n\
                \n\
                ## ask\n\
                `ask` answers a plain-language question across both catalogs and returns a JSON envelope.\n\
                Per-catalog failures appear as `{error, error_message, suggestion}` inside the envelope.\n\
                \n\
                ## Error: invalid identifier\n\
                Unity database names must have exactly two non-empty dot-separated parts."
                    .to_string(),
            ),
        }
    }
}
