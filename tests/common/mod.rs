//! In-process mock catalog servers for integration tests.
//!
//! Both mocks bind to `127.0.0.1:0` and serve canned metadata:
//!
//! Unity (three levels):
//! - `unity.retail`: `customers`, `orders`
//! - `unity.default`: `marksheet`
//! - `broken`: listing its schemas fails with 500
//!
//! Glue (two levels):
//! - `sales`: `orders`, `returns`
//! - `marketing`: `campaigns`

#![allow(dead_code)]

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use catalog_mcp_server::catalog::{GlueCatalog, GlueConfig, UnityCatalog, UnityConfig};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use url::Url;

/// Serve `app` on an ephemeral local port.
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Slice `items` for one page. Tokens are offsets into the list.
fn paginate(items: Vec<Value>, limit: Option<usize>, token: Option<&str>) -> (Vec<Value>, Option<String>) {
    let start: usize = token.and_then(|t| t.parse().ok()).unwrap_or(0);
    let limit = limit.unwrap_or(usize::MAX);
    let end = start.saturating_add(limit).min(items.len());
    let next = (end < items.len()).then(|| end.to_string());
    (items[start.min(end)..end].to_vec(), next)
}

// Unity mock

#[derive(Default)]
pub struct UnityState {
    /// Number of requests served, for pagination assertions
    pub requests: AtomicUsize,
    /// Include the `broken` catalog
    pub with_broken_catalog: bool,
}

fn unity_tables() -> Vec<(&'static str, &'static str, Value)> {
    vec![
        (
            "unity",
            "retail",
            json!({
                "name": "customers",
                "catalog_name": "unity",
                "schema_name": "retail",
                "comment": "Customer master data",
                "data_source_format": "DELTA",
                "storage_location": "s3://lake/retail/customers",
                "columns": [
                    {"name": "customer_id", "type_text": "int", "comment": "Primary key"},
                    {"name": "email", "type_text": "string"}
                ]
            }),
        ),
        (
            "unity",
            "retail",
            json!({
                "name": "orders",
                "catalog_name": "unity",
                "schema_name": "retail",
                "data_source_format": "DELTA",
                "columns": [
                    {"name": "order_id", "type_text": "bigint"},
                    {"name": "Customer_Ref", "type_text": "int"}
                ]
            }),
        ),
        (
            "unity",
            "default",
            json!({
                "name": "marksheet",
                "catalog_name": "unity",
                "schema_name": "default",
                "comment": "Student marks",
                "data_source_format": "PARQUET",
                "columns": [
                    {"name": "id", "type_text": "int"},
                    {"name": "name", "type_text": "string"},
                    {"name": "marks", "type_text": "int"}
                ]
            }),
        ),
    ]
}

fn unity_error(status: StatusCode, code: &str, message: String) -> Response {
    (status, axum::Json(json!({"error_code": code, "message": message}))).into_response()
}

fn page_params(params: &HashMap<String, String>) -> (Option<usize>, Option<&str>) {
    (
        params.get("max_results").and_then(|m| m.parse().ok()),
        params.get("page_token").map(String::as_str),
    )
}

async fn unity_catalogs(
    State(state): State<Arc<UnityState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let mut names = vec![json!({"name": "unity"})];
    if state.with_broken_catalog {
        names.push(json!({"name": "broken"}));
    }
    let (limit, token) = page_params(&params);
    let (page, next) = paginate(names, limit, token);
    axum::Json(json!({"catalogs": page, "next_page_token": next})).into_response()
}

async fn unity_schemas(
    State(state): State<Arc<UnityState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let catalog = params.get("catalog_name").cloned().unwrap_or_default();
    if catalog == "broken" {
        return unity_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "metastore unavailable".to_string(),
        );
    }
    let mut schemas: Vec<&str> = unity_tables()
        .into_iter()
        .filter(|(c, _, _)| *c == catalog)
        .map(|(_, s, _)| s)
        .collect();
    schemas.sort();
    schemas.dedup();
    if schemas.is_empty() {
        return unity_error(
            StatusCode::NOT_FOUND,
            "CATALOG_DOES_NOT_EXIST",
            format!("Catalog '{}' does not exist.", catalog),
        );
    }
    let items = schemas.into_iter().map(|s| json!({"name": s})).collect();
    let (limit, token) = page_params(&params);
    let (page, next) = paginate(items, limit, token);
    axum::Json(json!({"schemas": page, "next_page_token": next})).into_response()
}

async fn unity_list_tables(
    State(state): State<Arc<UnityState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let catalog = params.get("catalog_name").cloned().unwrap_or_default();
    let schema = params.get("schema_name").cloned().unwrap_or_default();
    let items: Vec<Value> = unity_tables()
        .into_iter()
        .filter(|(c, s, _)| *c == catalog && *s == schema)
        .map(|(_, _, t)| t)
        .collect();
    if items.is_empty() {
        return unity_error(
            StatusCode::NOT_FOUND,
            "SCHEMA_DOES_NOT_EXIST",
            format!("Schema '{}.{}' does not exist.", catalog, schema),
        );
    }
    let (limit, token) = page_params(&params);
    let (page, next) = paginate(items, limit, token);
    axum::Json(json!({"tables": page, "next_page_token": next})).into_response()
}

async fn unity_get_table(
    State(state): State<Arc<UnityState>>,
    Path(full_name): Path<String>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    unity_tables()
        .into_iter()
        .find(|(c, s, t)| format!("{}.{}.{}", c, s, t["name"].as_str().unwrap_or_default()) == full_name)
        .map(|(_, _, t)| axum::Json(t).into_response())
        .unwrap_or_else(|| {
            unity_error(
                StatusCode::NOT_FOUND,
                "TABLE_DOES_NOT_EXIST",
                format!("Table '{}' does not exist.", full_name),
            )
        })
}

pub fn unity_router(state: Arc<UnityState>) -> Router {
    let api = Router::new()
        .route("/catalogs", get(unity_catalogs))
        .route("/schemas", get(unity_schemas))
        .route("/tables", get(unity_list_tables))
        .route("/tables/{full_name}", get(unity_get_table))
        .with_state(state);
    Router::new().nest("/api/2.1/unity-catalog", api)
}

/// Start a Unity mock and return its state and API base URL.
pub async fn start_unity(with_broken_catalog: bool) -> (Arc<UnityState>, Url) {
    let state = Arc::new(UnityState {
        with_broken_catalog,
        ..Default::default()
    });
    let addr = spawn(unity_router(state.clone())).await;
    let url = Url::parse(&format!("http://{}/api/2.1/unity-catalog", addr)).unwrap();
    (state, url)
}

pub fn unity_client(url: Url) -> UnityCatalog {
    UnityCatalog::new(UnityConfig::new(url).with_timeout(Duration::from_secs(5))).unwrap()
}

// Glue mock

#[derive(Default)]
pub struct GlueState {
    /// `X-Amz-Target` of every request, in order
    pub targets: std::sync::Mutex<Vec<String>>,
    /// `Authorization` header of the last request, if any
    pub last_authorization: std::sync::Mutex<Option<String>>,
    /// Page size for `GetDatabases`
    pub database_page_size: Option<usize>,
}

fn glue_tables() -> Vec<Value> {
    let parquet = "org.apache.hadoop.hive.ql.io.parquet.MapredParquetInputFormat";
    vec![
        json!({
            "Name": "orders",
            "DatabaseName": "sales",
            "Description": "All customer orders",
            "StorageDescriptor": {
                "Columns": [
                    {"Name": "order_id", "Type": "bigint"},
                    {"Name": "customer_id", "Type": "int", "Comment": "FK to customers"},
                    {"Name": "amount", "Type": "decimal(10,2)"}
                ],
                "Location": "s3://lake/sales/orders/",
                "InputFormat": parquet
            }
        }),
        json!({
            "Name": "returns",
            "DatabaseName": "sales",
            "Description": "Customer returns",
            "StorageDescriptor": {
                "Columns": [
                    {"Name": "return_id", "Type": "bigint"},
                    {"Name": "order_id", "Type": "bigint"},
                    {"Name": "reason", "Type": "string"}
                ],
                "Location": "s3://lake/sales/returns/",
                "InputFormat": "org.apache.hadoop.mapred.TextInputFormat"
            }
        }),
        json!({
            "Name": "campaigns",
            "DatabaseName": "marketing",
            "StorageDescriptor": {
                "Columns": [
                    {"Name": "campaign_id", "Type": "int"},
                    {"Name": "channel", "Type": "string"}
                ]
            }
        }),
    ]
}

fn glue_error(error_type: &str, message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({"__type": error_type, "Message": message})),
    )
        .into_response()
}

/// Glue's own search matches names, descriptions and column names.
fn glue_search_hit(table: &Value, text: &str) -> bool {
    let text = text.to_lowercase();
    let hit = |v: &Value| v.as_str().is_some_and(|s| s.to_lowercase().contains(&text));
    hit(&table["Name"])
        || hit(&table["Description"])
        || table["StorageDescriptor"]["Columns"]
            .as_array()
            .is_some_and(|cols| cols.iter().any(|c| hit(&c["Name"])))
}

async fn glue_handler(
    State(state): State<Arc<GlueState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Glue sends `application/x-amz-json-1.1`, which the Json extractor rejects.
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let target = headers
        .get("x-amz-target")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.targets.lock().unwrap().push(target.clone());
    *state.last_authorization.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let token = body["NextToken"].as_str();
    let database = body["DatabaseName"].as_str().unwrap_or_default();
    match target.trim_start_matches("AWSGlue.") {
        "GetDatabases" => {
            let items = vec![json!({"Name": "marketing"}), json!({"Name": "sales"})];
            let limit = body["MaxResults"]
                .as_u64()
                .map(|n| n as usize)
                .or(state.database_page_size);
            let (page, next) = paginate(items, limit, token);
            axum::Json(json!({"DatabaseList": page, "NextToken": next})).into_response()
        }
        "GetTables" => {
            if !["sales", "marketing"].contains(&database) {
                return glue_error(
                    "EntityNotFoundException",
                    format!("Database {} not found.", database),
                );
            }
            let items: Vec<Value> = glue_tables()
                .into_iter()
                .filter(|t| t["DatabaseName"] == database)
                .collect();
            axum::Json(json!({"TableList": items})).into_response()
        }
        "GetTable" => {
            let name = body["Name"].as_str().unwrap_or_default();
            match glue_tables()
                .into_iter()
                .find(|t| t["DatabaseName"] == database && t["Name"] == name)
            {
                Some(table) => axum::Json(json!({"Table": table})).into_response(),
                None => glue_error(
                    "com.amazonaws.glue#EntityNotFoundException",
                    format!("Table {} not found.", name),
                ),
            }
        }
        "SearchTables" => {
            let text = body["SearchText"].as_str().unwrap_or_default();
            let limit = body["MaxResults"].as_u64().map(|n| n as usize);
            let items: Vec<Value> = glue_tables()
                .into_iter()
                .filter(|t| glue_search_hit(t, text))
                .collect();
            let (page, next) = paginate(items, limit, token);
            axum::Json(json!({"TableList": page, "NextToken": next})).into_response()
        }
        other => glue_error("InvalidInputException", format!("Unknown operation {}", other)),
    }
}

pub fn glue_router(state: Arc<GlueState>) -> Router {
    Router::new().route("/", post(glue_handler)).with_state(state)
}

/// Start a Glue mock and return its state and endpoint.
pub async fn start_glue(state: GlueState) -> (Arc<GlueState>, Url) {
    let state = Arc::new(state);
    let addr = spawn(glue_router(state.clone())).await;
    let url = Url::parse(&format!("http://{}/", addr)).unwrap();
    (state, url)
}

pub fn glue_config(endpoint: Url) -> GlueConfig {
    GlueConfig::new("us-east-1")
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(5))
}

pub fn glue_client(endpoint: Url) -> GlueCatalog {
    GlueCatalog::new(glue_config(endpoint)).unwrap()
}

/// A URL nothing listens on.
pub fn dead_url(path: &str) -> Url {
    Url::parse(&format!("http://127.0.0.1:9{}", path)).unwrap()
}

// Misbehaving pagination

/// Page tokens that alternate `a`, `b`, `a`, ... and never finish.
fn cycling_token(token: Option<&str>) -> &'static str {
    match token {
        Some("a") => "b",
        _ => "a",
    }
}

/// A Unity server whose catalog listing cycles its page tokens.
pub async fn start_cycling_unity() -> Url {
    let app = Router::new().route(
        "/api/2.1/unity-catalog/catalogs",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            let next = cycling_token(params.get("page_token").map(String::as_str));
            axum::Json(json!({"catalogs": [{"name": "loop"}], "next_page_token": next}))
        }),
    );
    let addr = spawn(app).await;
    Url::parse(&format!("http://{}/api/2.1/unity-catalog", addr)).unwrap()
}

/// A Glue endpoint whose GetDatabases pages cycle their tokens.
pub async fn start_cycling_glue() -> Url {
    let app = Router::new().route(
        "/",
        post(|body: Bytes| async move {
            let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            let next = cycling_token(body["NextToken"].as_str());
            axum::Json(json!({"DatabaseList": [{"Name": "loop"}], "NextToken": next}))
        }),
    );
    let addr = spawn(app).await;
    Url::parse(&format!("http://{}/", addr)).unwrap()
}
