//! Core traits, types, and error handling for census-mcp.
//!
//! This crate provides the foundational abstractions shared by the Census
//! API client, the output formatter and the MCP server.

pub mod config;
pub mod error;
pub mod provider;
pub mod table;
pub mod types;

pub use config::{Config, Transport};
pub use error::{Error, Result};
pub use provider::CensusProvider;
pub use types::*;
