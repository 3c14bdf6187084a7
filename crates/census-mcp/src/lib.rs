//! MCP (Model Context Protocol) server for census-mcp.
//!
//! This crate exposes the Census tools to AI assistants over stdio or
//! HTTP + SSE. Tool results are always delivered as successful responses;
//! failures are reported inside the result payload.

pub mod arguments;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod sse;
pub mod tools;
pub mod transport;

pub use handlers::ToolHandler;
pub use server::McpServer;
