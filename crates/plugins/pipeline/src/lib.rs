//! Output formatting for Census tool results.
//!
//! Every provider result is wrapped in a [`CensusData`] variant and rendered
//! to Markdown by a [`Formatter`]. Rendering is total: each variant, empty
//! collections included, produces text and never an error.
//!
//! # Example
//!
//! ```ignore
//! use census_pipeline::{CensusData, Formatter};
//!
//! let formatter = Formatter::new();
//! let states = provider.get_state_population("").await?;
//! let text = formatter.format(&CensusData::PopulationList(states));
//! ```

pub mod markdown;

use census_core::{
    CustomQueryRow, DatasetDescriptor, GeographyLevelDescriptor, PopulationRecord, VariableMap,
};
use tracing::{debug, Span};

/// A provider result to render.
#[derive(Debug, Clone)]
pub enum CensusData {
    PopulationList(Vec<PopulationRecord>),
    DatasetList(Vec<DatasetDescriptor>),
    VariableMap(VariableMap),
    GeographyLevelList(Vec<GeographyLevelDescriptor>),
    CustomRowList(Vec<CustomQueryRow>),
    /// Anything else renders as its literal text.
    Other(serde_json::Value),
}

impl CensusData {
    /// Short name of the variant, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CensusData::PopulationList(_) => "population",
            CensusData::DatasetList(_) => "datasets",
            CensusData::VariableMap(_) => "variables",
            CensusData::GeographyLevelList(_) => "geography_levels",
            CensusData::CustomRowList(_) => "custom_rows",
            CensusData::Other(_) => "other",
        }
    }

    /// Number of entries carried.
    pub fn len(&self) -> usize {
        match self {
            CensusData::PopulationList(items) => items.len(),
            CensusData::DatasetList(items) => items.len(),
            CensusData::VariableMap(items) => items.len(),
            CensusData::GeographyLevelList(items) => items.len(),
            CensusData::CustomRowList(items) => items.len(),
            CensusData::Other(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<PopulationRecord>> for CensusData {
    fn from(records: Vec<PopulationRecord>) -> Self {
        CensusData::PopulationList(records)
    }
}

impl From<Vec<DatasetDescriptor>> for CensusData {
    fn from(datasets: Vec<DatasetDescriptor>) -> Self {
        CensusData::DatasetList(datasets)
    }
}

impl From<VariableMap> for CensusData {
    fn from(variables: VariableMap) -> Self {
        CensusData::VariableMap(variables)
    }
}

impl From<Vec<GeographyLevelDescriptor>> for CensusData {
    fn from(levels: Vec<GeographyLevelDescriptor>) -> Self {
        CensusData::GeographyLevelList(levels)
    }
}

impl From<Vec<CustomQueryRow>> for CensusData {
    fn from(rows: Vec<CustomQueryRow>) -> Self {
        CensusData::CustomRowList(rows)
    }
}

/// Renders [`CensusData`] to Markdown.
///
/// Holds no state besides the tracing span its events are recorded under,
/// so one instance can be shared by concurrent tool calls.
#[derive(Debug, Clone)]
pub struct Formatter {
    span: Span,
}

impl Formatter {
    /// Create a formatter logging under a `formatter` span.
    pub fn new() -> Self {
        Self::with_span(tracing::debug_span!("formatter"))
    }

    /// Create a formatter logging under the given span.
    pub fn with_span(span: Span) -> Self {
        Self { span }
    }

    /// Render a result as text.
    pub fn format(&self, data: &CensusData) -> String {
        let _guard = self.span.enter();

        let output = match data {
            CensusData::PopulationList(records) => markdown::population_to_markdown(records),
            CensusData::DatasetList(datasets) => markdown::datasets_to_markdown(datasets),
            CensusData::VariableMap(variables) => markdown::variables_to_markdown(variables),
            CensusData::GeographyLevelList(levels) => {
                markdown::geography_levels_to_markdown(levels)
            }
            CensusData::CustomRowList(rows) => markdown::custom_rows_to_markdown(rows),
            CensusData::Other(serde_json::Value::String(text)) => text.clone(),
            CensusData::Other(value) => value.to_string(),
        };

        debug!(
            kind = data.kind(),
            items = data.len(),
            chars = output.len(),
            "Formatted result"
        );
        output
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}
