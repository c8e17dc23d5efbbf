//! MCP tool implementations.
//!
//! This module contains all catalog tool handlers:
//! - `catalog`: list databases, list tables, table details, name and column search
//! - `ask`: natural-language questions routed across both catalogs
//! - `format`: ASCII and markdown rendering of table details

pub mod ask;
pub mod catalog;
pub mod format;

pub use ask::{AskInput, AskToolHandler};
pub use catalog::{
    CatalogToolHandler, ListDatabasesOutput, ListTablesInput, ListTablesOutput,
    SearchByColumnInput, SearchByNameInput, SearchOutput, TableDetailsInput, TableDetailsOutput,
};
pub use format::OutputFormat;
