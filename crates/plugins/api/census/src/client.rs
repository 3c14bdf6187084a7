//! Census API client implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use census_core::table::RawTable;
use census_core::types::require_dataset_and_year;
use census_core::{
    CensusProvider, CustomQueryRow, CustomQuerySpec, DatasetDescriptor, Error,
    GeographyLevelDescriptor, PopulationRecord, Result, VariableDescriptor, VariableMap, WILDCARD,
};
use tracing::{debug, info, warn};

use crate::types::{
    CatalogEntry, CensusCatalog, CensusGeography, CensusGeographyLevel, CensusVariables,
    GeographyLevels,
};
use crate::{DEFAULT_CENSUS_URL, POPULATION_DATASET, POPULATION_VARIABLE, POPULATION_YEAR};

/// Census data API client.
pub struct CensusClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl CensusClient {
    /// Create a new Census client.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_CENSUS_URL, api_key)
    }

    /// Create a new Census client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// URL of the dataset catalog.
    fn catalog_url(&self) -> String {
        format!("{}/data.json", self.base_url)
    }

    /// URL of a dataset vintage, optionally followed by a metadata document.
    fn dataset_url(&self, year: &str, dataset: &str, document: Option<&str>) -> String {
        match document {
            Some(document) => format!("{}/data/{}/{}/{}", self.base_url, year, dataset, document),
            None => format!("{}/data/{}/{}", self.base_url, year, dataset),
        }
    }

    /// Make a GET request and return the body of a 200 response.
    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        debug!(url = url, params = query.len(), "Census GET request");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let status_code = status.as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(
                status = status_code,
                url = url,
                message = message.as_str(),
                "Census API error response"
            );
            return Err(Error::from_status(status_code, message));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Http(format!("Failed to read response body: {}", e)))
    }

    /// Make a GET request and deserialize a JSON document.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get_text(url, &[]).await?;
        serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))
    }

    /// Make a data query, appending the API key, and zip the table.
    async fn get_table(
        &self,
        url: &str,
        mut query: Vec<(&str, String)>,
    ) -> Result<Vec<CustomQueryRow>> {
        query.push(("key", self.api_key.clone()));
        let body = self.get_text(url, &query).await?;
        let records = RawTable::parse(&body)?.into_records();
        debug!(url = url, count = records.len(), "Census table decoded");
        Ok(records)
    }

    /// Fetch population estimates for the given geography clauses.
    async fn get_population(&self, geography: Vec<(&str, String)>) -> Result<Vec<PopulationRecord>> {
        let url = self.dataset_url(POPULATION_YEAR, POPULATION_DATASET, None);
        let mut query = vec![("get", format!("NAME,{}", POPULATION_VARIABLE))];
        query.extend(geography);

        let rows = self.get_table(&url, query).await?;
        Ok(rows.into_iter().map(map_population).collect())
    }
}

// =============================================================================
// Mapping functions: Census documents -> domain records
// =============================================================================

fn map_population(mut row: CustomQueryRow) -> PopulationRecord {
    let state = row.remove("state").filter(|s| !s.is_empty());
    // A county without its state would break the nesting invariant.
    let county = row
        .remove("county")
        .filter(|c| !c.is_empty() && state.is_some());

    PopulationRecord {
        name: row.remove("NAME").unwrap_or_default(),
        population: row.remove(POPULATION_VARIABLE).unwrap_or_default(),
        state,
        county,
    }
}

/// Split an access URL into `(year, dataset path)`.
///
/// Returns `None` unless the URL contains `/data/` exactly once and at
/// least two path segments follow it.
fn split_access_url(access_url: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = access_url.split("/data/").collect();
    if parts.len() != 2 {
        return None;
    }

    let segments: Vec<&str> = parts[1].split('/').collect();
    if segments.len() < 2 {
        return None;
    }

    Some((segments[0].to_string(), segments[1..].join("/")))
}

/// Group catalog distributions by dataset path, keeping first-seen order.
fn map_catalog(catalog: CensusCatalog) -> Vec<DatasetDescriptor> {
    let mut datasets: Vec<DatasetDescriptor> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for entry in catalog.dataset.into_iter().flat_map(CatalogEntry::flatten) {
        for distribution in &entry.distribution {
            let Some((year, path)) = split_access_url(&distribution.access_url) else {
                skipped += 1;
                continue;
            };

            match index.get(&path) {
                Some(&i) => {
                    if !datasets[i].years.contains(&year) {
                        datasets[i].years.push(year);
                    }
                }
                None => {
                    index.insert(path.clone(), datasets.len());
                    datasets.push(DatasetDescriptor {
                        title: if entry.title.is_empty() {
                            path.clone()
                        } else {
                            entry.title.clone()
                        },
                        description: entry.description.clone(),
                        dataset_id: path,
                        years: vec![year],
                    });
                }
            }
        }
    }

    if skipped > 0 {
        debug!(skipped = skipped, "Skipped catalog distributions without a dataset path");
    }
    if datasets.is_empty() {
        warn!(skipped = skipped, "Dataset catalog yielded no datasets");
    }

    datasets
}

fn map_variables(document: CensusVariables) -> VariableMap {
    document
        .variables
        .into_iter()
        .map(|(code, variable)| {
            let descriptor = VariableDescriptor {
                code: code.clone(),
                label: variable.label,
                description: variable.description.filter(|s| !s.is_empty()),
                concept: variable.concept.filter(|s| !s.is_empty()),
                group: variable.group.filter(|s| !s.is_empty()),
            };
            (code, descriptor)
        })
        .collect()
}

fn map_geography_level(key: Option<String>, level: CensusGeographyLevel) -> GeographyLevelDescriptor {
    let name = match key {
        Some(key) if level.name.is_empty() => key,
        _ => level.name,
    };

    GeographyLevelDescriptor {
        name,
        description: level.description,
        required_ancestors: level.requires.unwrap_or_default(),
        supports_wildcard: level
            .wildcard
            .map(|w| w.is_supported())
            .unwrap_or(false),
    }
}

fn map_geography(document: CensusGeography) -> Vec<GeographyLevelDescriptor> {
    match document.fips {
        GeographyLevels::List(levels) => levels
            .into_iter()
            .map(|level| map_geography_level(None, level))
            .collect(),
        GeographyLevels::Map(levels) => levels
            .into_iter()
            .map(|(key, level)| map_geography_level(Some(key), level))
            .collect(),
    }
}

#[async_trait]
impl CensusProvider for CensusClient {
    fn provider_name(&self) -> &'static str {
        "census"
    }

    async fn get_state_population(&self, state_id: &str) -> Result<Vec<PopulationRecord>> {
        info!(state_id = state_id, "Fetching state population");

        let target = if state_id.is_empty() { WILDCARD } else { state_id };
        self.get_population(vec![("for", format!("state:{}", target))])
            .await
    }

    async fn get_county_population(&self, state_id: &str) -> Result<Vec<PopulationRecord>> {
        info!(state_id = state_id, "Fetching county population");

        let mut geography = vec![("for", format!("county:{}", WILDCARD))];
        if !state_id.is_empty() {
            geography.push(("in", format!("state:{}", state_id)));
        }
        self.get_population(geography).await
    }

    async fn search_state_by_name(&self, name: &str) -> Result<Vec<PopulationRecord>> {
        info!(name = name, "Searching states by name");

        let states = self.get_state_population("").await?;
        let matches: Vec<PopulationRecord> = states
            .into_iter()
            .filter(|state| state.name_contains(name))
            .collect();

        debug!(name = name, count = matches.len(), "State search finished");
        Ok(matches)
    }

    async fn get_available_datasets(&self) -> Result<Vec<DatasetDescriptor>> {
        info!("Fetching dataset catalog");

        let catalog: CensusCatalog = self.get_json(&self.catalog_url()).await?;
        let datasets = map_catalog(catalog);

        debug!(count = datasets.len(), "Dataset catalog grouped");
        Ok(datasets)
    }

    async fn get_variables(&self, dataset: &str, year: &str) -> Result<VariableMap> {
        info!(dataset = dataset, year = year, "Fetching variables");
        require_dataset_and_year(dataset, year)?;

        let url = self.dataset_url(year, dataset, Some("variables.json"));
        let document: CensusVariables = self.get_json(&url).await?;
        Ok(map_variables(document))
    }

    async fn get_geography_levels(
        &self,
        dataset: &str,
        year: &str,
    ) -> Result<Vec<GeographyLevelDescriptor>> {
        info!(dataset = dataset, year = year, "Fetching geography levels");
        require_dataset_and_year(dataset, year)?;

        let url = self.dataset_url(year, dataset, Some("geography.json"));
        let document: CensusGeography = self.get_json(&url).await?;
        Ok(map_geography(document))
    }

    async fn get_custom_data(&self, spec: &CustomQuerySpec) -> Result<Vec<CustomQueryRow>> {
        info!(
            dataset = spec.dataset.as_str(),
            year = spec.year.as_str(),
            geo_level = spec.geo_level.as_str(),
            variables = spec.variables.len(),
            "Fetching custom data"
        );
        spec.validate()?;
        let target = spec.target_filter()?;

        let url = self.dataset_url(&spec.year, &spec.dataset, None);
        let mut query = vec![
            ("get", spec.variables.join(",")),
            ("for", format!("{}:{}", spec.geo_level, target)),
        ];
        for (level, value) in spec.ancestor_filters() {
            query.push(("in", format!("{}:{}", level, value)));
        }

        self.get_table(&url, query).await
    }
}
