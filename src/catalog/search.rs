//! Cross-namespace enumeration for three-level catalogs.
//!
//! The three-level catalog has no search endpoint, so name and column
//! searches walk catalogs → schemas → tables one request at a time and filter
//! locally. A search over N schemas costs N+1 sequential round trips (plus one
//! per table for column search).
//!
//! Failure policy differs by operation:
//! - [`list_schema_refs`] fails as soon as any catalog's schema listing fails.
//! - [`search_by_name`] and [`search_by_column`] skip catalogs, schemas and
//!   tables that cannot be read and return whatever they gathered, which is
//!   an empty list when the backend is unreachable altogether.

use crate::error::CatalogResult;
use crate::models::{SchemaRef, TableDescriptor, TableMatch, contains_ignore_case};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Read-only view of a three-level namespace.
#[async_trait]
pub trait NamespaceBrowser: Send + Sync {
    /// Names of all top-level catalogs.
    async fn catalogs(&self) -> CatalogResult<Vec<String>>;

    /// Schema names inside one catalog.
    async fn schemas(&self, catalog: &str) -> CatalogResult<Vec<String>>;

    /// Table names inside one schema.
    async fn tables(&self, schema: &SchemaRef) -> CatalogResult<Vec<String>>;

    /// Full details of one table.
    async fn table(&self, schema: &SchemaRef, table: &str) -> CatalogResult<TableDescriptor>;
}

/// Every `catalog.schema` pair, failing on the first unreadable catalog.
pub async fn list_schema_refs<B>(browser: &B) -> CatalogResult<Vec<SchemaRef>>
where
    B: NamespaceBrowser + ?Sized,
{
    let mut refs = Vec::new();
    for catalog in browser.catalogs().await? {
        for schema in browser.schemas(&catalog).await? {
            refs.push(SchemaRef::new(catalog.as_str(), schema));
        }
    }
    Ok(refs)
}

/// Every readable `catalog.schema` pair; unreadable branches are skipped.
async fn reachable_schema_refs<B>(browser: &B) -> Vec<SchemaRef>
where
    B: NamespaceBrowser + ?Sized,
{
    let catalogs = match browser.catalogs().await {
        Ok(catalogs) => catalogs,
        Err(e) => {
            warn!(error = %e, "Cannot list catalogs, search returns no results");
            return Vec::new();
        }
    };

    let mut refs = Vec::new();
    for catalog in catalogs {
        match browser.schemas(&catalog).await {
            Ok(schemas) => {
                refs.extend(
                    schemas
                        .into_iter()
                        .map(|schema| SchemaRef::new(catalog.as_str(), schema)),
                );
            }
            Err(e) => {
                warn!(catalog = %catalog, error = %e, "Skipping catalog during search");
            }
        }
    }
    refs
}

/// Tables whose name contains `pattern`, ignoring case.
pub async fn search_by_name<B>(browser: &B, pattern: &str) -> CatalogResult<Vec<TableMatch>>
where
    B: NamespaceBrowser + ?Sized,
{
    let mut matches = Vec::new();
    for schema in reachable_schema_refs(browser).await {
        let tables = match browser.tables(&schema).await {
            Ok(tables) => tables,
            Err(e) => {
                warn!(schema = %schema, error = %e, "Skipping schema during search");
                continue;
            }
        };
        matches.extend(
            tables
                .into_iter()
                .filter(|name| contains_ignore_case(name, pattern))
                .map(|name| TableMatch::by_name(schema.to_string(), name)),
        );
    }

    debug!(pattern = %pattern, count = matches.len(), "Searched tables by name");
    Ok(matches)
}

/// Tables with at least one column whose name contains `pattern`, ignoring case.
pub async fn search_by_column<B>(browser: &B, pattern: &str) -> CatalogResult<Vec<TableMatch>>
where
    B: NamespaceBrowser + ?Sized,
{
    let mut candidates = Vec::new();
    for schema in reachable_schema_refs(browser).await {
        match browser.tables(&schema).await {
            Ok(tables) => candidates.extend(tables.into_iter().map(|t| (schema.clone(), t))),
            Err(e) => {
                warn!(schema = %schema, error = %e, "Skipping schema during search");
            }
        }
    }

    let mut matches = Vec::new();
    for (schema, table) in candidates {
        let details = match browser.table(&schema, &table).await {
            Ok(details) => details,
            Err(e) => {
                warn!(schema = %schema, table = %table, error = %e, "Skipping table during search");
                continue;
            }
        };
        let columns = details.matching_columns(pattern);
        if !columns.is_empty() {
            matches.push(TableMatch::by_columns(schema.to_string(), table, columns));
        }
    }

    debug!(pattern = %pattern, count = matches.len(), "Searched tables by column");
    Ok(matches)
}
