//! Provider trait for Census data sources.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    CustomQuerySpec, CustomQueryRow, DatasetDescriptor, GeographyLevelDescriptor,
    PopulationRecord, VariableMap,
};

/// Source of Census data (the live REST API or the in-memory mock).
///
/// Implementations hold no mutable state between calls, so one instance can
/// serve concurrent tool calls.
#[async_trait]
pub trait CensusProvider: Send + Sync {
    /// Get the provider name (e.g., "census", "mock")
    fn provider_name(&self) -> &'static str;

    /// Population of one state, or of every state when `state_id` is empty.
    async fn get_state_population(&self, state_id: &str) -> Result<Vec<PopulationRecord>>;

    /// Population of the counties of one state, or of every county when
    /// `state_id` is empty.
    async fn get_county_population(&self, state_id: &str) -> Result<Vec<PopulationRecord>>;

    /// States whose name contains `name`, ignoring case.
    async fn search_state_by_name(&self, name: &str) -> Result<Vec<PopulationRecord>>;

    /// Datasets listed in the Census catalog.
    async fn get_available_datasets(&self) -> Result<Vec<DatasetDescriptor>>;

    /// Variables of a dataset vintage.
    async fn get_variables(&self, dataset: &str, year: &str) -> Result<VariableMap>;

    /// Geography levels of a dataset vintage.
    async fn get_geography_levels(
        &self,
        dataset: &str,
        year: &str,
    ) -> Result<Vec<GeographyLevelDescriptor>>;

    /// Run a free-form tabular query.
    async fn get_custom_data(&self, spec: &CustomQuerySpec) -> Result<Vec<CustomQueryRow>>;
}
