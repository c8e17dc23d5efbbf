//! Catalog MCP Server Library
//!
//! MCP (Model Context Protocol) tools that let AI assistants discover data
//! products in a Unity catalog and an AWS Glue Data Catalog, either through
//! per-catalog browsing tools or a single natural-language `ask` tool.

pub mod agent;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod readiness;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{CatalogError, CatalogResult};
pub use mcp::CatalogService;
