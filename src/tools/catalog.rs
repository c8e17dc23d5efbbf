//! Catalog browsing tools.
//!
//! The same five operations are exposed once per catalog
//! (`list_unity_databases`, `list_glue_databases`, ...). This module holds the
//! shared inputs, outputs and the handler that runs them against one adapter.

use crate::catalog::CatalogAdapter;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{CatalogKind, TableDescriptor, TableMatch};
use crate::tools::format::{OutputFormat, format_as_markdown, format_as_table};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Input for the list_*_tables tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTablesInput {
    /// Database name. Unity: 'catalog_name.schema_name'. Glue: the database name.
    pub database_name: String,
}

/// Input for the get_*_table_details tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TableDetailsInput {
    /// Database name. Unity: 'catalog_name.schema_name'. Glue: the database name.
    pub database_name: String,
    /// Name of the table
    pub table_name: String,
    /// Output format: "json" returns structured data, "table" returns ASCII table, "markdown" returns markdown table
    #[serde(default)]
    pub format: OutputFormat,
}

/// Input for the search_*_tables_by_name tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchByNameInput {
    /// Case-insensitive substring of the table name
    pub name_pattern: String,
}

/// Input for the search_*_tables_by_column tools.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchByColumnInput {
    /// Case-insensitive substring of a column name
    pub column_pattern: String,
}

/// Output for the list_*_databases tools.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListDatabasesOutput {
    pub catalog: CatalogKind,
    /// Unity: 'catalog_name.schema_name' pairs. Glue: database names.
    pub databases: Vec<String>,
    pub count: usize,
}

/// Output for the list_*_tables tools.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ListTablesOutput {
    pub catalog: CatalogKind,
    pub database: String,
    pub tables: Vec<String>,
    pub count: usize,
}

/// Output for the get_*_table_details tools.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct TableDetailsOutput {
    pub catalog: CatalogKind,
    /// Table details. Omitted if format is table/markdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableDescriptor>,
    /// Pre-formatted output when format is table or markdown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

impl TableDetailsOutput {
    pub fn new(catalog: CatalogKind, table: TableDescriptor, format: OutputFormat) -> Self {
        let (table, formatted) = match format {
            OutputFormat::Json => (Some(table), None),
            OutputFormat::Table => (None, Some(format_as_table(&table))),
            OutputFormat::Markdown => (None, Some(format_as_markdown(&table))),
        };
        Self {
            catalog,
            table,
            formatted,
        }
    }
}

/// Output for the search tools.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SearchOutput {
    pub catalog: CatalogKind,
    pub pattern: String,
    /// For column searches each match lists the matching columns
    pub matches: Vec<TableMatch>,
    pub count: usize,
}

/// Runs the catalog tools against one adapter.
#[derive(Clone)]
pub struct CatalogToolHandler {
    adapter: Arc<dyn CatalogAdapter>,
}

impl CatalogToolHandler {
    pub fn new(adapter: Arc<dyn CatalogAdapter>) -> Self {
        Self { adapter }
    }

    pub fn kind(&self) -> CatalogKind {
        self.adapter.kind()
    }

    pub async fn list_databases(&self) -> CatalogResult<ListDatabasesOutput> {
        let databases = self.adapter.list_databases().await?;
        let count = databases.len();
        info!(catalog = %self.kind(), count, "Listed databases");
        Ok(ListDatabasesOutput {
            catalog: self.kind(),
            databases,
            count,
        })
    }

    pub async fn list_tables(&self, input: ListTablesInput) -> CatalogResult<ListTablesOutput> {
        let database = input.database_name.trim().to_string();
        let tables = self.adapter.list_tables(&database).await?;
        let count = tables.len();
        info!(catalog = %self.kind(), database = %database, count, "Listed tables");
        Ok(ListTablesOutput {
            catalog: self.kind(),
            database,
            tables,
            count,
        })
    }

    pub async fn get_table_details(
        &self,
        input: TableDetailsInput,
    ) -> CatalogResult<TableDetailsOutput> {
        let table = self
            .adapter
            .get_table_details(input.database_name.trim(), input.table_name.trim())
            .await?;
        info!(
            catalog = %self.kind(),
            database = %table.database,
            table = %table.name,
            columns = table.columns.len(),
            "Described table"
        );
        Ok(TableDetailsOutput::new(self.kind(), table, input.format))
    }

    pub async fn search_by_name(&self, input: SearchByNameInput) -> CatalogResult<SearchOutput> {
        let pattern = require_pattern("name_pattern", &input.name_pattern)?;
        let matches = self.adapter.search_tables_by_name(&pattern).await?;
        Ok(self.search_output(pattern, matches))
    }

    pub async fn search_by_column(
        &self,
        input: SearchByColumnInput,
    ) -> CatalogResult<SearchOutput> {
        let pattern = require_pattern("column_pattern", &input.column_pattern)?;
        let matches = self.adapter.search_tables_by_column(&pattern).await?;
        Ok(self.search_output(pattern, matches))
    }

    fn search_output(&self, pattern: String, matches: Vec<TableMatch>) -> SearchOutput {
        let count = matches.len();
        info!(catalog = %self.kind(), pattern = %pattern, count, "Searched tables");
        SearchOutput {
            catalog: self.kind(),
            pattern,
            matches,
            count,
        }
    }
}

/// An empty pattern would match every table; ask for a real one instead.
fn require_pattern(field: &str, pattern: &str) -> CatalogResult<String> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        Err(CatalogError::invalid_input(format!(
            "{} must not be empty",
            field
        )))
    } else {
        Ok(trimmed.to_string())
    }
}
