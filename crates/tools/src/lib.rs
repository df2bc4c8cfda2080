//! Jetty tool catalog + backend gateway.
//!
//! This crate is used by:
//! - `jetty-mcp` (the MCP server binary)
//! - integration tests that drive the dispatcher against mock backends
//!
//! It contains **no** MCP transport wiring. Callers hand it a tool name and an argument object
//! and get back either a `CallToolResult` or a typed [`error::JettyError`].

pub mod catalog;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod semantics;
mod validate;

pub use catalog::{CATALOG, ToolSpec};
pub use client::{BackendGateway, BackendRequest, HttpVerb, RequestBody};
pub use config::{Backend, GatewayConfig};
pub use dispatch::ToolRegistry;
pub use error::{JettyError, Result};
