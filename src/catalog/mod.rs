//! Catalog adapters.
//!
//! This module provides access to the supported metadata catalogs:
//! - `unity`: Unity Catalog REST API (three-level namespace)
//! - `glue`: AWS Glue Data Catalog JSON API (two-level namespace)
//! - `search`: catalog → schema → table fan-out for catalogs without native search
//! - `sigv4`: AWS Signature Version 4 request signing for Glue

pub mod glue;
pub mod search;
pub mod sigv4;
pub mod unity;

pub use glue::{GlueCatalog, GlueConfig};
pub use search::NamespaceBrowser;
pub use sigv4::AwsCredentials;
pub use unity::{UnityCatalog, UnityConfig};

use crate::error::{CatalogError, CatalogResult};
use crate::models::{CatalogKind, TableDescriptor, TableMatch};
use async_trait::async_trait;
use std::collections::HashSet;

/// The five-operation contract every catalog backend is normalized into.
///
/// `database` is the backend's own database identifier: a plain name for
/// Glue, `catalog_name.schema_name` for Unity.
#[async_trait]
pub trait CatalogAdapter: Send + Sync {
    /// Which backend this adapter talks to.
    fn kind(&self) -> CatalogKind;

    /// List every database. Fails as a whole if any part of the listing fails.
    async fn list_databases(&self) -> CatalogResult<Vec<String>>;

    /// List the table names in one database.
    async fn list_tables(&self, database: &str) -> CatalogResult<Vec<String>>;

    /// Fetch and normalize one table's details.
    async fn get_table_details(&self, database: &str, table: &str)
    -> CatalogResult<TableDescriptor>;

    /// Tables whose name contains `pattern` (case-insensitive).
    async fn search_tables_by_name(&self, pattern: &str) -> CatalogResult<Vec<TableMatch>>;

    /// Tables with at least one column whose name contains `pattern` (case-insensitive).
    async fn search_tables_by_column(&self, pattern: &str) -> CatalogResult<Vec<TableMatch>>;

    /// Cheapest call that proves the backend is reachable.
    async fn ping(&self) -> CatalogResult<()>;
}

/// Reject empty or whitespace-only names before they reach a backend.
pub(crate) fn require_name<'a>(field: &str, value: &'a str) -> CatalogResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CatalogError::invalid_input(format!(
            "{} must not be empty",
            field
        )))
    } else {
        Ok(trimmed)
    }
}

/// Pagination state for a list call.
///
/// Ends on a missing or empty token, or when the server repeats the token it
/// was just given. A token seen on an earlier page means the server is
/// cycling, which is an error rather than an endless loop.
#[derive(Debug, Default)]
pub(crate) struct PageCursor {
    current: Option<String>,
    seen: HashSet<String>,
}

impl PageCursor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Token to send with the next request.
    pub(crate) fn token(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Record the token a page returned. `Ok(true)` when another page should be read.
    pub(crate) fn advance(&mut self, next: Option<String>, object: &str) -> CatalogResult<bool> {
        let Some(next) = next.filter(|t| !t.is_empty()) else {
            return Ok(false);
        };
        if self.current.as_deref() == Some(next.as_str()) {
            return Ok(false);
        }
        if !self.seen.insert(next.clone()) {
            return Err(CatalogError::catalog(
                format!("Pagination for '{}' returned page token '{}' twice", object, next),
                "The catalog service is cycling page tokens; check its pagination",
            ));
        }
        self.current = Some(next);
        Ok(true)
    }
}
