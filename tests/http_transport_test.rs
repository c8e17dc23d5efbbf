//! HTTP transport tests: bearer auth in front of the MCP endpoint.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use catalog_mcp_server::CatalogService;
use catalog_mcp_server::agent::{CatalogRouter, KeywordExtractor};
use catalog_mcp_server::auth::AuthConfig;
use catalog_mcp_server::catalog::CatalogAdapter;
use catalog_mcp_server::transport::HttpTransport;
use common::{dead_url, glue_client, unity_client};
use std::sync::Arc;
use tower::ServiceExt;

const INITIALIZE: &str = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"test","version":"0"}}}"#;

fn transport(tokens: &[&str]) -> HttpTransport {
    let unity: Arc<dyn CatalogAdapter> = Arc::new(unity_client(dead_url("/api/2.1/unity-catalog")));
    let glue: Arc<dyn CatalogAdapter> = Arc::new(glue_client(dead_url("/")));
    let router = CatalogRouter::new(unity.clone(), glue.clone(), Arc::new(KeywordExtractor::new()));
    let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    HttpTransport::new(CatalogService::new(unity, glue, router), "127.0.0.1", 0, "/mcp")
        .with_auth(AuthConfig::from_tokens(&tokens).unwrap())
}

fn initialize(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header(header::HOST, "localhost")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, "application/json, text/event-stream");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::from(INITIALIZE)).unwrap()
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let response = transport(&["s3cret"])
        .router()
        .oneshot(initialize(None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_wrong_token_is_unauthorized() {
    let response = transport(&["s3cret"])
        .router()
        .oneshot(initialize(Some("Bearer guess")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_reaches_mcp_endpoint() {
    let response = transport(&["one", "s3cret"])
        .router()
        .oneshot(initialize(Some("Bearer s3cret")))
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.status().is_success(), "status {}", response.status());
}

#[tokio::test]
async fn test_without_tokens_auth_is_off() {
    let transport = transport(&[]);
    assert!(!transport.auth_enabled());
    let response = transport.router().oneshot(initialize(None)).await.unwrap();
    assert!(response.status().is_success(), "status {}", response.status());
}
