//! Domain records returned by Census providers.
//!
//! Every record is built fresh from a single response (or from the static
//! mock tables) and dropped once it has been formatted.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Wildcard filter value: every entity at a geography level.
pub const WILDCARD: &str = "*";

/// Population estimate for a state or a county.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub name: String,
    /// Numeric text exactly as the API returned it.
    pub population: String,
    pub state: Option<String>,
    /// Only ever set together with `state`.
    pub county: Option<String>,
}

impl PopulationRecord {
    /// A state-level record.
    pub fn state(
        name: impl Into<String>,
        population: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            population: population.into(),
            state: Some(state.into()),
            county: None,
        }
    }

    /// A county nested under its state.
    pub fn county(
        name: impl Into<String>,
        population: impl Into<String>,
        state: impl Into<String>,
        county: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            population: population.into(),
            state: Some(state.into()),
            county: Some(county.into()),
        }
    }

    /// Case-insensitive substring match on the region name.
    ///
    /// An empty needle matches every record.
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}

/// Dataset from the Census catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub title: String,
    pub description: String,
    /// Path segments joined by "/", e.g. "acs/acs1".
    pub dataset_id: String,
    /// Vintages in catalog order, not re-sorted.
    pub years: Vec<String>,
}

/// Variable metadata keyed by its code in a [`VariableMap`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    pub code: String,
    pub label: String,
    pub description: Option<String>,
    pub concept: Option<String>,
    pub group: Option<String>,
}

/// Variables of a dataset, keyed by variable code. Iteration order is unspecified.
pub type VariableMap = HashMap<String, VariableDescriptor>;

/// A tier of the geographic hierarchy supported by a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeographyLevelDescriptor {
    pub name: String,
    pub description: String,
    pub required_ancestors: Vec<String>,
    pub supports_wildcard: bool,
}

/// One row of a custom query, keyed by column name.
pub type CustomQueryRow = BTreeMap<String, String>;

/// Parameters of a free-form tabular query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomQuerySpec {
    pub variables: Vec<String>,
    pub dataset: String,
    pub year: String,
    pub geo_level: String,
    /// Level name to id or [`WILDCARD`]. The `geo_level` entry becomes the
    /// `for=` clause; every other entry becomes an `in=` ancestor constraint.
    pub geo_filters: BTreeMap<String, String>,
}

impl CustomQuerySpec {
    /// Create a spec that selects every entity at `geo_level`.
    pub fn new(
        variables: Vec<String>,
        dataset: impl Into<String>,
        year: impl Into<String>,
        geo_level: impl Into<String>,
    ) -> Self {
        let geo_level = geo_level.into();
        let mut geo_filters = BTreeMap::new();
        geo_filters.insert(geo_level.clone(), WILDCARD.to_string());
        Self {
            variables,
            dataset: dataset.into(),
            year: year.into(),
            geo_level,
            geo_filters,
        }
    }

    /// Check the required fields, naming the first one that is missing.
    pub fn validate(&self) -> Result<()> {
        if self.variables.is_empty() {
            return Err(Error::Validation(
                "at least one variable is required".to_string(),
            ));
        }
        if self.dataset.is_empty() {
            return Err(Error::Validation("dataset is required".to_string()));
        }
        if self.year.is_empty() {
            return Err(Error::Validation("year is required".to_string()));
        }
        if self.geo_level.is_empty() {
            return Err(Error::Validation("geography level is required".to_string()));
        }
        Ok(())
    }

    /// Value of the `for=` clause for the requested level.
    pub fn target_filter(&self) -> Result<&str> {
        self.geo_filters
            .get(&self.geo_level)
            .map(String::as_str)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "geography filter must contain an entry for '{}'",
                    self.geo_level
                ))
            })
    }

    /// Ancestor constraints: every filter except the requested level.
    pub fn ancestor_filters(&self) -> impl Iterator<Item = (&String, &String)> {
        self.geo_filters
            .iter()
            .filter(move |(level, _)| **level != self.geo_level)
    }
}

/// Validate the dataset/year pair shared by the metadata operations.
pub fn require_dataset_and_year(dataset: &str, year: &str) -> Result<()> {
    if dataset.is_empty() || year.is_empty() {
        return Err(Error::Validation(
            "both dataset and year are required".to_string(),
        ));
    }
    Ok(())
}
