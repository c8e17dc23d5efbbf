//! MCP server integration module.
//!
//! Exposes the catalog tool handlers over MCP using the rmcp framework.

pub mod service;

pub use service::CatalogService;
