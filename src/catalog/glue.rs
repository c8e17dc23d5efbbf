//! AWS Glue Data Catalog adapter (two-level namespace).
//!
//! Speaks the Glue JSON 1.1 protocol directly: every operation is a `POST /`
//! with an `X-Amz-Target: AWSGlue.<Operation>` header and a JSON body.
//! Requests are SigV4-signed when credentials are configured, and sent
//! unsigned otherwise (for local emulators such as LocalStack or moto).

use crate::catalog::sigv4::{self, AwsCredentials, SigningParams};
use crate::catalog::{CatalogAdapter, PageCursor, require_name};
use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    CatalogKind, ColumnDescriptor, TableDescriptor, TableMatch, contains_ignore_case,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_GLUE_REGION: &str = "us-east-1";
pub const DEFAULT_SEARCH_MAX_RESULTS: u32 = 100;

const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const SERVICE: &str = "glue";

/// Connection settings for the Glue Data Catalog.
#[derive(Debug, Clone)]
pub struct GlueConfig {
    pub region: String,
    /// Override the regional endpoint (e.g., `http://localhost:4566`)
    pub endpoint: Option<Url>,
    /// `None` sends unsigned requests
    pub credentials: Option<AwsCredentials>,
    /// Per-request timeout
    pub timeout: Duration,
    /// `MaxResults` for each `SearchTables` page
    pub search_max_results: u32,
}

impl GlueConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            credentials: None,
            timeout: Duration::from_secs(crate::config::DEFAULT_CATALOG_TIMEOUT_SECS),
            search_max_results: DEFAULT_SEARCH_MAX_RESULTS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn with_credentials(mut self, credentials: AwsCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The endpoint requests are sent to.
    pub fn resolved_endpoint(&self) -> CatalogResult<Url> {
        match &self.endpoint {
            Some(url) => Ok(url.clone()),
            None => Url::parse(&format!("https://glue.{}.amazonaws.com/", self.region)).map_err(
                |e| CatalogError::invalid_input(format!("Invalid Glue region '{}': {}", self.region, e)),
            ),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetDatabasesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_results: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetTablesRequest<'a> {
    database_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetTableRequest<'a> {
    database_name: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SearchTablesRequest<'a> {
    search_text: &'a str,
    max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetDatabasesResponse {
    #[serde(default)]
    database_list: Vec<GlueDatabase>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GlueDatabase {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TableListResponse {
    #[serde(default)]
    table_list: Vec<GlueTable>,
    #[serde(default)]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetTableResponse {
    table: GlueTable,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GlueTable {
    name: String,
    #[serde(default)]
    database_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    storage_descriptor: Option<StorageDescriptor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StorageDescriptor {
    #[serde(default)]
    columns: Vec<GlueColumn>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    input_format: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GlueColumn {
    name: String,
    #[serde(rename = "Type", default)]
    data_type: String,
    #[serde(default)]
    comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlueErrorBody {
    #[serde(rename = "__type", default)]
    error_type: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

impl GlueTable {
    fn column_names(&self) -> impl Iterator<Item = &str> {
        self.storage_descriptor
            .iter()
            .flat_map(|sd| sd.columns.iter().map(|c| c.name.as_str()))
    }

    fn into_descriptor(self, database: &str) -> TableDescriptor {
        let sd = self.storage_descriptor.unwrap_or_default();
        let columns = sd
            .columns
            .into_iter()
            .map(|c| ColumnDescriptor::new(c.name, c.data_type).with_comment(c.comment.unwrap_or_default()))
            .collect();
        TableDescriptor::new(self.name, database)
            .with_description(self.description.unwrap_or_default())
            .with_columns(columns)
            .with_location(sd.location.unwrap_or_default())
            .with_format(format_tag(sd.input_format.as_deref()))
    }
}

/// Short format tag from a Hadoop input format class name.
///
/// # Examples
///
/// ```
/// use catalog_mcp_server::catalog::glue::format_tag;
///
/// assert_eq!(
///     format_tag(Some("org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat")),
///     "MapredParquet"
/// );
/// assert_eq!(format_tag(None), "");
/// ```
pub fn format_tag(input_format: Option<&str>) -> String {
    match input_format {
        Some(class) if !class.is_empty() => class
            .rsplit('.')
            .next()
            .unwrap_or(class)
            .replace("InputFormat", ""),
        _ => String::new(),
    }
}

/// Map a Glue error response into the error taxonomy.
fn service_error(status: StatusCode, body: &str, object: &str) -> CatalogError {
    let parsed: Option<GlueErrorBody> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|b| b.message.clone())
        .unwrap_or_else(|| body.trim().to_string());
    // `__type` may carry a namespace prefix: "com.amazonaws.glue#EntityNotFoundException"
    let error_type = parsed
        .and_then(|b| b.error_type)
        .map(|t| t.rsplit('#').next().unwrap_or_default().to_string())
        .unwrap_or_default();

    match error_type.as_str() {
        "EntityNotFoundException" => CatalogError::not_found(object, message),
        "InvalidInputException" => CatalogError::invalid_input(message),
        "ThrottlingException" | "OperationTimeoutException" | "InternalServiceException" => {
            CatalogError::unavailable(
                format!("{}: {}", error_type, message),
                "The Glue service is busy or degraded; try again shortly",
            )
        }
        _ if status.is_server_error() => CatalogError::unavailable(
            format!("Glue returned {}: {}", status, message),
            "The Glue service is busy or degraded; try again shortly",
        ),
        "" => CatalogError::catalog(
            format!("Glue returned {}: {}", status, message),
            "Please check the AWS Glue endpoint and credentials",
        ),
        other => CatalogError::catalog(
            format!("{}: {}", other, message),
            "Please check the AWS Glue endpoint and credentials",
        ),
    }
}

/// Glue Data Catalog client.
pub struct GlueCatalog {
    client: Client,
    endpoint: Url,
    region: String,
    credentials: Option<AwsCredentials>,
    search_max_results: u32,
}

impl GlueCatalog {
    pub fn new(config: GlueConfig) -> CatalogResult<Self> {
        let endpoint = config.resolved_endpoint()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CatalogError::internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint,
            region: config.region,
            credentials: config.credentials,
            search_max_results: config.search_max_results.max(1),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn is_signed(&self) -> bool {
        self.credentials.is_some()
    }

    /// Invoke one Glue operation.
    async fn call<Req, Resp>(&self, operation: &str, request: &Req, object: &str) -> CatalogResult<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_vec(request)
            .map_err(|e| CatalogError::internal(format!("Failed to encode request: {}", e)))?;
        let target = format!("AWSGlue.{}", operation);

        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .header("content-type", CONTENT_TYPE)
            .header("x-amz-target", &target);

        if let Some(credentials) = &self.credentials {
            let params = SigningParams {
                credentials,
                region: &self.region,
                service: SERVICE,
                time: Utc::now(),
            };
            let signed = sigv4::sign(
                "POST",
                &self.endpoint,
                &[("content-type", CONTENT_TYPE), ("x-amz-target", &target)],
                &body,
                &params,
            );
            for (name, value) in signed {
                builder = builder.header(name, value);
            }
        }

        debug!(operation = %operation, "Glue request");
        let response = builder.body(body).send().await.map_err(|e| {
            match CatalogError::from(e) {
                CatalogError::Unavailable { message, .. } => CatalogError::unavailable(
                    message,
                    format!("Please ensure AWS Glue is reachable at {}", self.endpoint),
                ),
                other => other,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(service_error(status, &text, object));
        }

        response.json::<Resp>().await.map_err(CatalogError::from)
    }

    /// All pages of `SearchTables` for `text`.
    async fn search_tables(&self, text: &str) -> CatalogResult<Vec<GlueTable>> {
        let mut tables = Vec::new();
        let mut cursor = PageCursor::new();
        loop {
            let request = SearchTablesRequest {
                search_text: text,
                max_results: self.search_max_results,
                next_token: cursor.token(),
            };
            let page: TableListResponse = self.call("SearchTables", &request, text).await?;
            tables.extend(page.table_list);
            if !cursor.advance(page.next_token, text)? {
                break;
            }
        }
        Ok(tables)
    }
}

#[async_trait]
impl CatalogAdapter for GlueCatalog {
    fn kind(&self) -> CatalogKind {
        CatalogKind::Glue
    }

    async fn list_databases(&self) -> CatalogResult<Vec<String>> {
        let mut names = Vec::new();
        let mut cursor = PageCursor::new();
        loop {
            let request = GetDatabasesRequest {
                next_token: cursor.token(),
                max_results: None,
            };
            let page: GetDatabasesResponse =
                self.call("GetDatabases", &request, "databases").await?;
            names.extend(page.database_list.into_iter().map(|db| db.name));
            if !cursor.advance(page.next_token, "databases")? {
                break;
            }
        }
        info!(count = names.len(), "Listed Glue databases");
        Ok(names)
    }

    async fn list_tables(&self, database: &str) -> CatalogResult<Vec<String>> {
        let database = require_name("database_name", database)?;
        let mut names = Vec::new();
        let mut cursor = PageCursor::new();
        loop {
            let request = GetTablesRequest {
                database_name: database,
                next_token: cursor.token(),
            };
            let page: TableListResponse = self.call("GetTables", &request, database).await?;
            names.extend(page.table_list.into_iter().map(|t| t.name));
            if !cursor.advance(page.next_token, database)? {
                break;
            }
        }
        info!(database = %database, count = names.len(), "Listed Glue tables");
        Ok(names)
    }

    async fn get_table_details(
        &self,
        database: &str,
        table: &str,
    ) -> CatalogResult<TableDescriptor> {
        let database = require_name("database_name", database)?;
        let table = require_name("table_name", table)?;
        let object = format!("{}.{}", database, table);
        let request = GetTableRequest {
            database_name: database,
            name: table,
        };
        let response: GetTableResponse = self.call("GetTable", &request, &object).await?;
        Ok(response.table.into_descriptor(database))
    }

    async fn search_tables_by_name(&self, pattern: &str) -> CatalogResult<Vec<TableMatch>> {
        // SearchTables also matches descriptions and columns; keep name hits only.
        let matches: Vec<TableMatch> = self
            .search_tables(pattern)
            .await?
            .into_iter()
            .filter(|t| contains_ignore_case(&t.name, pattern))
            .map(|t| TableMatch::by_name(t.database_name.unwrap_or_default(), t.name))
            .collect();
        debug!(pattern = %pattern, count = matches.len(), "Searched Glue tables by name");
        Ok(matches)
    }

    async fn search_tables_by_column(&self, pattern: &str) -> CatalogResult<Vec<TableMatch>> {
        let mut matches = Vec::new();
        for table in self.search_tables(pattern).await? {
            let columns: Vec<String> = table
                .column_names()
                .filter(|name| contains_ignore_case(name, pattern))
                .map(String::from)
                .collect();
            if !columns.is_empty() {
                matches.push(TableMatch::by_columns(
                    table.database_name.unwrap_or_default(),
                    table.name,
                    columns,
                ));
            }
        }
        debug!(pattern = %pattern, count = matches.len(), "Searched Glue tables by column");
        Ok(matches)
    }

    async fn ping(&self) -> CatalogResult<()> {
        let request = GetDatabasesRequest {
            next_token: None,
            max_results: Some(1),
        };
        let _: GetDatabasesResponse = self.call("GetDatabases", &request, "databases").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tag_variants() {
        assert_eq!(
            format_tag(Some("org.apache.hadoop.mapred.TextInputFormat")),
            "Text"
        );
        assert_eq!(
            format_tag(Some(
                "org.apache.hadoop.hive.ql.io.orc.OrcInputFormat"
            )),
            "Orc"
        );
        assert_eq!(format_tag(Some("CustomReader")), "CustomReader");
        assert_eq!(format_tag(Some("")), "");
    }

    #[test]
    fn test_default_endpoint_uses_region() {
        let config = GlueConfig::new("eu-west-1");
        assert_eq!(
            config.resolved_endpoint().unwrap().as_str(),
            "https://glue.eu-west-1.amazonaws.com/"
        );
    }

    #[test]
    fn test_endpoint_override() {
        let config =
            GlueConfig::new("us-east-1").with_endpoint(Url::parse("http://localhost:4566").unwrap());
        let glue = GlueCatalog::new(config).unwrap();
        assert_eq!(glue.endpoint().as_str(), "http://localhost:4566/");
        assert!(!glue.is_signed());
    }

    #[test]
    fn test_request_bodies_use_glue_field_names() {
        let body = serde_json::to_value(SearchTablesRequest {
            search_text: "cust",
            max_results: 100,
            next_token: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"SearchText": "cust", "MaxResults": 100}));

        let body = serde_json::to_value(GetTableRequest {
            database_name: "sales",
            name: "orders",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"DatabaseName": "sales", "Name": "orders"}));
    }

    #[test]
    fn test_table_mapping() {
        let response: GetTableResponse = serde_json::from_str(
            r#"{"Table": {
                "Name": "orders",
                "DatabaseName": "sales",
                "Description": "Order facts",
                "StorageDescriptor": {
                    "Columns": [
                        {"Name": "order_id", "Type": "bigint"},
                        {"Name": "customer_id", "Type": "bigint", "Comment": "FK"}
                    ],
                    "Location": "s3://lake/sales/orders/",
                    "InputFormat": "org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat"
                }
            }}"#,
        )
        .unwrap();
        let table = response.table.into_descriptor("sales");
        assert_eq!(table.name, "orders");
        assert_eq!(table.database, "sales");
        assert_eq!(table.description, "Order facts");
        assert_eq!(table.location, "s3://lake/sales/orders/");
        assert_eq!(table.format, "MapredParquet");
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[1].comment.as_deref(), Some("FK"));
    }

    #[test]
    fn test_table_without_storage_descriptor() {
        let table: GlueTable = serde_json::from_str(r#"{"Name": "view_only"}"#).unwrap();
        assert_eq!(table.column_names().count(), 0);
        let descriptor = table.into_descriptor("db");
        assert!(descriptor.columns.is_empty());
        assert_eq!(descriptor.format, "");
    }

    #[test]
    fn test_service_error_mapping() {
        let err = service_error(
            StatusCode::BAD_REQUEST,
            r#"{"__type":"EntityNotFoundException","Message":"Database x not found."}"#,
            "x",
        );
        assert!(matches!(err, CatalogError::NotFound { .. }));

        let err = service_error(
            StatusCode::BAD_REQUEST,
            r#"{"__type":"com.amazonaws.glue#InvalidInputException","message":"bad name"}"#,
            "x",
        );
        assert!(matches!(err, CatalogError::InvalidInput { .. }));

        let err = service_error(
            StatusCode::BAD_REQUEST,
            r#"{"__type":"ThrottlingException","Message":"Rate exceeded"}"#,
            "x",
        );
        assert!(matches!(err, CatalogError::Unavailable { .. }));

        let err = service_error(StatusCode::BAD_GATEWAY, "<html>", "x");
        assert!(matches!(err, CatalogError::Unavailable { .. }));

        let err = service_error(
            StatusCode::FORBIDDEN,
            r#"{"__type":"AccessDeniedException","Message":"nope"}"#,
            "x",
        );
        assert!(matches!(err, CatalogError::Catalog { .. }));
        assert!(err.to_string().contains("AccessDeniedException"));
    }

    #[tokio::test]
    async fn test_blank_names_rejected_before_request() {
        let glue = GlueCatalog::new(
            GlueConfig::new("us-east-1").with_endpoint(Url::parse("http://127.0.0.1:9").unwrap()),
        )
        .unwrap();
        let err = glue.list_tables("  ").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput { .. }));
        let err = glue.get_table_details("sales", "").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput { .. }));
    }
}
