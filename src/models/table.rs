//! Table metadata models shared by every catalog adapter.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single column as reported by a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Type text from the source catalog (e.g., `bigint`, `array<string>`); not validated
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            comment: None,
        }
    }

    /// Set the column comment. Empty comments are treated as absent.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        self.comment = (!comment.is_empty()).then_some(comment);
        self
    }
}

/// Normalized table details, identical in shape for both catalogs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableDescriptor {
    pub name: String,
    /// Database identifier the table was requested under
    pub database: String,
    pub description: String,
    pub columns: Vec<ColumnDescriptor>,
    /// Storage location (e.g., s3://bucket/path)
    pub location: String,
    /// Short storage format tag (e.g., DELTA, Parquet)
    pub format: String,
}

impl TableDescriptor {
    /// Create a new table descriptor with no columns.
    pub fn new(name: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database: database.into(),
            description: String::new(),
            columns: Vec::new(),
            location: String::new(),
            format: String::new(),
        }
    }

    /// Set the table description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the column list.
    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = columns;
        self
    }

    /// Set the storage location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the storage format tag.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Names of the columns whose name contains `pattern`, ignoring case.
    pub fn matching_columns(&self, pattern: &str) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| contains_ignore_case(&c.name, pattern))
            .map(|c| c.name.clone())
            .collect()
    }
}

/// One search hit: a table, and for column searches the columns that matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableMatch {
    pub database: String,
    pub table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_columns: Option<Vec<String>>,
}

impl TableMatch {
    /// A hit from a table name search.
    pub fn by_name(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            matching_columns: None,
        }
    }

    /// A hit from a column search.
    pub fn by_columns(
        database: impl Into<String>,
        table: impl Into<String>,
        matching_columns: Vec<String>,
    ) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            matching_columns: Some(matching_columns),
        }
    }
}

/// Case-insensitive substring test used by every search operation.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
