//! Census API metadata response types.
//!
//! These types represent the raw JSON documents served by the catalog,
//! `variables.json` and `geography.json` endpoints. They are deserialized
//! and then mapped to the records in `census_core::types`.

use std::collections::HashMap;

use serde::Deserialize;

// =============================================================================
// Dataset catalog (data.json)
// =============================================================================

/// Root of the dataset catalog.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CensusCatalog {
    #[serde(default)]
    pub dataset: Vec<CatalogEntry>,
}

/// One catalog entry (a dataset vintage).
///
/// Older catalogs wrap the vintages in a `c_dataset` list instead of
/// listing them at the top level.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub distribution: Vec<CatalogDistribution>,
    #[serde(default)]
    pub c_dataset: Vec<CatalogEntry>,
}

impl CatalogEntry {
    /// This entry followed by its nested entries, depth first.
    pub fn flatten(self) -> Vec<CatalogEntry> {
        let mut entries = Vec::new();
        let mut pending = vec![self];
        while let Some(mut entry) = pending.pop() {
            let nested = std::mem::take(&mut entry.c_dataset);
            entries.push(entry);
            pending.extend(nested.into_iter().rev());
        }
        entries
    }
}

/// Access point of a catalog entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogDistribution {
    #[serde(default, rename = "accessURL")]
    pub access_url: String,
}

// =============================================================================
// Variables (variables.json)
// =============================================================================

/// Root of a `variables.json` document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CensusVariables {
    #[serde(default)]
    pub variables: HashMap<String, CensusVariable>,
}

/// A single variable definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CensusVariable {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub concept: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

// =============================================================================
// Geography (geography.json)
// =============================================================================

/// Root of a `geography.json` document.
#[derive(Debug, Clone, Deserialize)]
pub struct CensusGeography {
    #[serde(default)]
    pub fips: GeographyLevels,
}

/// The live API serves a list; older documents use a name-keyed map.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GeographyLevels {
    List(Vec<CensusGeographyLevel>),
    Map(HashMap<String, CensusGeographyLevel>),
}

impl Default for GeographyLevels {
    fn default() -> Self {
        GeographyLevels::List(Vec::new())
    }
}

/// A single geography level definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CensusGeographyLevel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "required_for")]
    pub requires: Option<Vec<String>>,
    #[serde(default, alias = "wildcards")]
    pub wildcard: Option<WildcardSupport>,
}

/// `wildcard` is a flag in some documents and a list of levels in others.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WildcardSupport {
    Flag(bool),
    Levels(Vec<String>),
}

impl WildcardSupport {
    pub fn is_supported(&self) -> bool {
        match self {
            WildcardSupport::Flag(flag) => *flag,
            WildcardSupport::Levels(levels) => !levels.is_empty(),
        }
    }
}
