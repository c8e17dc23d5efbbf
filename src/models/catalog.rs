//! Catalog kinds and namespace identifiers.
//!
//! The two-level catalog (Glue) addresses tables as `database.table`, so its
//! database identifier is a plain name. The three-level catalog (Unity)
//! addresses tables as `catalog.schema.table`, so a "database" there is the
//! dotted pair `catalog.schema`, modelled by [`SchemaRef`].

use crate::error::{CatalogError, CatalogResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported catalog backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// Three-level namespace (`catalog.schema.table`)
    Unity,
    /// Two-level namespace (`database.table`)
    Glue,
}

impl CatalogKind {
    /// Get the display name for this catalog kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Unity => "Unity catalog",
            Self::Glue => "AWS Glue catalog",
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A `catalog.schema` pair identifying a database in the three-level catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaRef {
    pub catalog: String,
    pub schema: String,
}

impl SchemaRef {
    pub fn new(catalog: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
        }
    }

    /// Parse a `catalog_name.schema_name` identifier.
    ///
    /// The identifier must contain exactly one dot and both components must be
    /// non-empty. Whitespace around either component is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use catalog_mcp_server::models::SchemaRef;
    ///
    /// let r = SchemaRef::parse("unity.retail").unwrap();
    /// assert_eq!(r.catalog, "unity");
    /// assert_eq!(r.schema, "retail");
    /// assert!(SchemaRef::parse("retail").is_err());
    /// assert!(SchemaRef::parse("a.b.c").is_err());
    /// ```
    pub fn parse(identifier: &str) -> CatalogResult<Self> {
        let parts: Vec<&str> = identifier.trim().split('.').map(str::trim).collect();
        if parts.len() != 2 {
            return Err(CatalogError::invalid_identifier(
                identifier,
                format!(
                    "expected 'catalog_name.schema_name' (exactly two dot-separated parts), got {} part(s)",
                    parts.len()
                ),
            ));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(CatalogError::invalid_identifier(
                identifier,
                "catalog and schema names must not be empty",
            ));
        }
        Ok(Self::new(parts[0], parts[1]))
    }

    /// Fully qualified name of a table inside this schema.
    pub fn table_full_name(&self, table: &str) -> String {
        format!("{}.{}.{}", self.catalog, self.schema, table)
    }
}

impl FromStr for SchemaRef {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.catalog, self.schema)
    }
}
