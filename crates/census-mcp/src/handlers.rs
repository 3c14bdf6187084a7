//! Tool handlers for the MCP server.
//!
//! Each tool parses its arguments, calls the provider and renders the
//! outcome through the formatter. Failures never escape as protocol errors:
//! they come back as `isError` tool results whose text starts with a fixed
//! per-tool prefix.

use std::sync::Arc;

use census_core::{CensusProvider, Result};
use census_pipeline::{CensusData, Formatter};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::arguments::{ArgumentMap, CustomDataArgs, DatasetArgs, PopulationArgs, SearchArgs};
use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::tools;

pub const STATE_POPULATION_ERROR: &str = "Ошибка при получении данных о населении: ";
pub const COUNTY_POPULATION_ERROR: &str = "Ошибка при получении данных о населении округов: ";
pub const SEARCH_ERROR: &str = "Ошибка при поиске штата: ";
pub const DATASETS_ERROR: &str = "Ошибка при получении данных о доступных наборах данных: ";
pub const VARIABLES_ERROR: &str = "Ошибка при получении данных о доступных переменных: ";
pub const GEOGRAPHY_ERROR: &str =
    "Ошибка при получении данных о доступных географических уровнях: ";
pub const CUSTOM_DATA_ERROR: &str = "Ошибка при получении пользовательских данных: ";

pub const UNKNOWN_TOOL: &str = "Неизвестный инструмент: ";

pub const NAME_REQUIRED: &str = "Необходимо указать параметр 'name'";
pub const DATASET_AND_YEAR_REQUIRED: &str = "Необходимо указать параметры 'dataset' и 'year'";
pub const CUSTOM_DATA_REQUIRED: &str =
    "Необходимо указать параметры 'dataset', 'year', 'geoLevel' и 'variables'";

/// Tool handler that executes tools against a Census provider.
pub struct ToolHandler {
    provider: Arc<dyn CensusProvider>,
    formatter: Formatter,
}

impl ToolHandler {
    /// Create a new tool handler.
    pub fn new(provider: Arc<dyn CensusProvider>) -> Self {
        Self {
            provider,
            formatter: Formatter::new(),
        }
    }

    /// Use the given formatter instead of the default one.
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Get available tool definitions.
    pub fn available_tools(&self) -> Vec<ToolDefinition> {
        tools::definitions()
    }

    /// Execute a tool by name with arguments.
    pub async fn execute(&self, name: &str, arguments: Option<Value>) -> ToolCallResult {
        let args = ArgumentMap::new(arguments.as_ref());

        match name {
            tools::GET_STATE_POPULATION => {
                self.handle_state_population(PopulationArgs::parse(args)).await
            }
            tools::GET_COUNTY_POPULATION => {
                self.handle_county_population(PopulationArgs::parse(args)).await
            }
            tools::SEARCH_STATE_BY_NAME => self.handle_search(SearchArgs::parse(args)).await,
            tools::GET_AVAILABLE_DATASETS => self.handle_datasets().await,
            tools::GET_VARIABLES => self.handle_variables(DatasetArgs::parse(args)).await,
            tools::GET_GEOGRAPHY_LEVELS => {
                self.handle_geography_levels(DatasetArgs::parse(args)).await
            }
            tools::GET_CUSTOM_DATA => self.handle_custom_data(CustomDataArgs::parse(args)).await,
            _ => {
                warn!(tool = name, "Unknown tool");
                ToolCallResult::error(format!("{}{}", UNKNOWN_TOOL, name))
            }
        }
    }

    /// Format a successful outcome, or prefix the error message.
    fn respond<T: Into<CensusData>>(
        &self,
        tool: &str,
        prefix: &str,
        outcome: Result<T>,
    ) -> ToolCallResult {
        match outcome {
            Ok(data) => {
                let data = data.into();
                debug!(tool = tool, items = data.len(), "Tool succeeded");
                ToolCallResult::text(self.formatter.format(&data))
            }
            Err(e) => {
                error!(tool = tool, error = %e, "Tool failed");
                ToolCallResult::error(format!("{}{}", prefix, e))
            }
        }
    }

    async fn handle_state_population(&self, args: PopulationArgs) -> ToolCallResult {
        info!(state_id = args.state_id.as_str(), "Getting state population");

        let outcome = self.provider.get_state_population(&args.state_id).await;
        self.respond(tools::GET_STATE_POPULATION, STATE_POPULATION_ERROR, outcome)
    }

    async fn handle_county_population(&self, args: PopulationArgs) -> ToolCallResult {
        info!(state_id = args.state_id.as_str(), "Getting county population");

        let outcome = self.provider.get_county_population(&args.state_id).await;
        self.respond(tools::GET_COUNTY_POPULATION, COUNTY_POPULATION_ERROR, outcome)
    }

    async fn handle_search(&self, args: SearchArgs) -> ToolCallResult {
        if !args.is_valid() {
            warn!("search_state_by_name called without a name");
            return ToolCallResult::error(NAME_REQUIRED);
        }
        info!(name = args.name.as_str(), "Searching states");

        match self.provider.search_state_by_name(&args.name).await {
            Ok(states) if states.is_empty() => {
                ToolCallResult::text(format!("Штаты не найдены по запросу: {}", args.name))
            }
            outcome => self.respond(tools::SEARCH_STATE_BY_NAME, SEARCH_ERROR, outcome),
        }
    }

    async fn handle_datasets(&self) -> ToolCallResult {
        info!("Getting available datasets");

        let outcome = self.provider.get_available_datasets().await;
        self.respond(tools::GET_AVAILABLE_DATASETS, DATASETS_ERROR, outcome)
    }

    async fn handle_variables(&self, args: DatasetArgs) -> ToolCallResult {
        if !args.is_valid() {
            warn!("get_variables called without dataset or year");
            return ToolCallResult::error(DATASET_AND_YEAR_REQUIRED);
        }
        info!(dataset = args.dataset.as_str(), year = args.year.as_str(), "Getting variables");

        let outcome = self.provider.get_variables(&args.dataset, &args.year).await;
        self.respond(tools::GET_VARIABLES, VARIABLES_ERROR, outcome)
    }

    async fn handle_geography_levels(&self, args: DatasetArgs) -> ToolCallResult {
        if !args.is_valid() {
            warn!("get_geography_levels called without dataset or year");
            return ToolCallResult::error(DATASET_AND_YEAR_REQUIRED);
        }
        info!(
            dataset = args.dataset.as_str(),
            year = args.year.as_str(),
            "Getting geography levels"
        );

        let outcome = self
            .provider
            .get_geography_levels(&args.dataset, &args.year)
            .await;
        self.respond(tools::GET_GEOGRAPHY_LEVELS, GEOGRAPHY_ERROR, outcome)
    }

    async fn handle_custom_data(&self, args: CustomDataArgs) -> ToolCallResult {
        let missing = args.missing();
        if !missing.is_empty() {
            warn!(missing = ?missing, "get_custom_data called without required arguments");
            return ToolCallResult::error(format!(
                "{} (не указаны: {})",
                CUSTOM_DATA_REQUIRED,
                missing.join(", ")
            ));
        }

        let spec = args.into_spec();
        info!(
            dataset = spec.dataset.as_str(),
            year = spec.year.as_str(),
            geo_level = spec.geo_level.as_str(),
            variables = spec.variables.len(),
            "Getting custom data"
        );

        let outcome = self.provider.get_custom_data(&spec).await;
        self.respond(tools::GET_CUSTOM_DATA, CUSTOM_DATA_ERROR, outcome)
    }
}
