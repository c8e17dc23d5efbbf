//! Unity Catalog adapter (three-level namespace).
//!
//! Talks to the Unity Catalog REST API (`/api/2.1/unity-catalog`):
//! - `GET /catalogs`
//! - `GET /schemas?catalog_name=`
//! - `GET /tables?catalog_name=&schema_name=`
//! - `GET /tables/{catalog}.{schema}.{table}`
//!
//! List endpoints are paginated with `next_page_token`; every page is read.

use crate::catalog::search::{self, NamespaceBrowser};
use crate::catalog::{CatalogAdapter, PageCursor, require_name};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{CatalogKind, ColumnDescriptor, SchemaRef, TableDescriptor, TableMatch};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_UNITY_URL: &str = "http://localhost:8080/api/2.1/unity-catalog";

/// Connection settings for a Unity Catalog server.
#[derive(Debug, Clone)]
pub struct UnityConfig {
    /// Base URL of the REST API, including the `/api/2.1/unity-catalog` prefix
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// `max_results` sent with list requests; `None` lets the server decide
    pub page_size: Option<u32>,
}

impl UnityConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(crate::config::DEFAULT_CATALOG_TIMEOUT_SECS),
            page_size: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// One page of a list response. The item array is keyed by the resource name.
#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default, alias = "catalogs", alias = "schemas", alias = "tables")]
    items: Vec<NamedEntry>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct UnityTable {
    #[serde(default)]
    name: String,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    columns: Vec<UnityColumn>,
    #[serde(default)]
    storage_location: Option<String>,
    #[serde(default)]
    data_source_format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnityColumn {
    #[serde(default)]
    name: String,
    #[serde(default)]
    type_text: String,
    #[serde(default)]
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnityErrorBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl UnityTable {
    fn into_descriptor(self, database: &SchemaRef) -> TableDescriptor {
        let columns = self
            .columns
            .into_iter()
            .map(|c| ColumnDescriptor::new(c.name, c.type_text).with_comment(c.comment.unwrap_or_default()))
            .collect();
        TableDescriptor::new(self.name, database.to_string())
            .with_description(self.comment.unwrap_or_default())
            .with_columns(columns)
            .with_location(self.storage_location.unwrap_or_default())
            .with_format(self.data_source_format.unwrap_or_default())
    }
}

/// HTTP client for one Unity Catalog server.
pub struct UnityCatalog {
    client: Client,
    base_url: Url,
    page_size: Option<u32>,
}

impl UnityCatalog {
    pub fn new(config: UnityConfig) -> CatalogResult<Self> {
        if config.base_url.cannot_be_a_base() {
            return Err(CatalogError::invalid_input(format!(
                "Unity catalog URL '{}' cannot be used as a base URL",
                config.base_url
            )));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url,
            page_size: config.page_size,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn unavailable(&self, err: reqwest::Error) -> CatalogError {
        match CatalogError::from(err) {
            CatalogError::Unavailable { message, .. } => CatalogError::unavailable(
                message,
                format!(
                    "Please ensure the Unity catalog service is running at {}",
                    self.base_url
                ),
            ),
            other => other,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
        object: &str,
    ) -> CatalogResult<T> {
        debug!(url = %url, "Unity catalog request");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body, object));
        }

        response.json::<T>().await.map_err(CatalogError::from)
    }

    /// Read every page of a list endpoint and collect the entry names.
    async fn list_names(
        &self,
        resource: &str,
        filters: &[(&str, &str)],
        object: &str,
    ) -> CatalogResult<Vec<String>> {
        let url = self.endpoint(&[resource]);
        let page_size = self.page_size.map(|n| n.to_string());
        let mut names = Vec::new();
        let mut cursor = PageCursor::new();

        loop {
            let page: Page = {
                let mut query: Vec<(&str, &str)> = filters.to_vec();
                if let Some(size) = &page_size {
                    query.push(("max_results", size.as_str()));
                }
                if let Some(t) = cursor.token() {
                    query.push(("page_token", t));
                }
                self.get_json(url.clone(), &query, object).await?
            };
            names.extend(page.items.into_iter().map(|e| e.name));

            if !cursor.advance(page.next_page_token, object)? {
                break;
            }
        }

        Ok(names)
    }
}

/// Map a non-success HTTP status into the error taxonomy.
fn status_error(status: StatusCode, body: &str, object: &str) -> CatalogError {
    let parsed: Option<UnityErrorBody> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|b| b.message.clone())
        .unwrap_or_else(|| body.trim().to_string());
    let code = parsed.and_then(|b| b.error_code);

    if status == StatusCode::NOT_FOUND {
        CatalogError::not_found(object, message)
    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        CatalogError::unavailable(
            format!("Unity catalog returned {}: {}", status, message),
            "Please ensure the Unity catalog service is running correctly",
        )
    } else {
        let detail = match code {
            Some(code) => format!("Unity catalog returned {} ({}): {}", status, code, message),
            None => format!("Unity catalog returned {}: {}", status, message),
        };
        CatalogError::catalog(detail, "Please check the Unity catalog service configuration")
    }
}

#[async_trait]
impl NamespaceBrowser for UnityCatalog {
    async fn catalogs(&self) -> CatalogResult<Vec<String>> {
        self.list_names("catalogs", &[], "catalogs").await
    }

    async fn schemas(&self, catalog: &str) -> CatalogResult<Vec<String>> {
        self.list_names("schemas", &[("catalog_name", catalog)], catalog)
            .await
    }

    async fn tables(&self, schema: &SchemaRef) -> CatalogResult<Vec<String>> {
        let object = schema.to_string();
        self.list_names(
            "tables",
            &[
                ("catalog_name", schema.catalog.as_str()),
                ("schema_name", schema.schema.as_str()),
            ],
            &object,
        )
        .await
    }

    async fn table(&self, schema: &SchemaRef, table: &str) -> CatalogResult<TableDescriptor> {
        let full_name = schema.table_full_name(table);
        let url = self.endpoint(&["tables", &full_name]);
        let raw: UnityTable = self.get_json(url, &[], &full_name).await?;
        Ok(raw.into_descriptor(schema))
    }
}

#[async_trait]
impl CatalogAdapter for UnityCatalog {
    fn kind(&self) -> CatalogKind {
        CatalogKind::Unity
    }

    async fn list_databases(&self) -> CatalogResult<Vec<String>> {
        let refs = search::list_schema_refs(self).await?;
        info!(count = refs.len(), "Listed Unity schemas");
        Ok(refs.iter().map(ToString::to_string).collect())
    }

    async fn list_tables(&self, database: &str) -> CatalogResult<Vec<String>> {
        let schema = SchemaRef::parse(database)?;
        let tables = self.tables(&schema).await?;
        info!(database = %schema, count = tables.len(), "Listed Unity tables");
        Ok(tables)
    }

    async fn get_table_details(
        &self,
        database: &str,
        table: &str,
    ) -> CatalogResult<TableDescriptor> {
        let schema = SchemaRef::parse(database)?;
        let table = require_name("table_name", table)?;
        self.table(&schema, table).await
    }

    async fn search_tables_by_name(&self, pattern: &str) -> CatalogResult<Vec<TableMatch>> {
        search::search_by_name(self, pattern).await
    }

    async fn search_tables_by_column(&self, pattern: &str) -> CatalogResult<Vec<TableMatch>> {
        search::search_by_column(self, pattern).await
    }

    async fn ping(&self) -> CatalogResult<()> {
        let url = self.endpoint(&["catalogs"]);
        let _: Page = self
            .get_json(url, &[("max_results", "1")], "catalogs")
            .await?;
        Ok(())
    }
}
