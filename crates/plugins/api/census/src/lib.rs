//! U.S. Census Bureau provider implementation for census-mcp.
//!
//! This crate provides the HTTP client for `api.census.gov` and an
//! in-memory mock with the same interface for offline operation.

mod client;
mod mock;
mod types;

pub use client::CensusClient;
pub use mock::MockCensusClient;

/// Default Census API URL.
pub const DEFAULT_CENSUS_URL: &str = "https://api.census.gov";

/// Vintage used by the population tools.
pub const POPULATION_YEAR: &str = "2021";

/// Dataset used by the population tools.
pub const POPULATION_DATASET: &str = "acs/acs1";

/// Total population estimate variable.
pub const POPULATION_VARIABLE: &str = "B01001_001E";
