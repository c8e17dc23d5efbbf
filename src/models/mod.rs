//! Data models for the Catalog MCP Server.
//!
//! This module re-exports all model types used throughout the application.

pub mod catalog;
pub mod envelope;
pub mod table;

// Re-export commonly used types
pub use catalog::{CatalogKind, SchemaRef};
pub use envelope::{AgentResponse, CatalogResults, ErrorReport};
pub use table::{ColumnDescriptor, TableDescriptor, TableMatch, contains_ignore_case};
