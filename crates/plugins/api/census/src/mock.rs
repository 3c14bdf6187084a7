//! In-memory Census provider for offline operation.
//!
//! Lookups by id never fail: an unknown state id yields the first state and
//! an unknown county filter yields the first county, so demos always have
//! something to show.

use async_trait::async_trait;
use census_core::types::require_dataset_and_year;
use census_core::{
    CensusProvider, CustomQueryRow, CustomQuerySpec, DatasetDescriptor, GeographyLevelDescriptor,
    PopulationRecord, Result, VariableDescriptor, VariableMap,
};
use tracing::debug;

/// (name, population, state)
const STATES: &[(&str, &str, &str)] = &[
    ("Alabama", "5024279", "01"),
    ("Alaska", "733391", "02"),
    ("Arizona", "7151502", "04"),
    ("California", "39538223", "06"),
    ("New York", "20201249", "36"),
    ("Texas", "29145505", "48"),
];

/// (name, population, state, county)
const COUNTIES: &[(&str, &str, &str, &str)] = &[
    ("Los Angeles County", "10014009", "06", "037"),
    ("San Diego County", "3298634", "06", "073"),
    ("Orange County", "3186989", "06", "059"),
    ("King County", "2252782", "53", "033"),
    ("Harris County", "4713325", "48", "201"),
];

/// (dataset id, title, description, years)
const DATASETS: &[(&str, &str, &str, &[&str])] = &[
    (
        "acs/acs1",
        "American Community Survey 1-Year Estimates",
        "Annual survey covering demographic, social, economic, and housing data",
        &["2019", "2020", "2021"],
    ),
    (
        "dec/sf1",
        "Decennial Census",
        "Complete count of the US population conducted every 10 years",
        &["2000", "2010", "2020"],
    ),
    (
        "pep/population",
        "Population Estimates Program",
        "Annual population estimates between decennial censuses",
        &["2018", "2019", "2020", "2021"],
    ),
];

/// (code, label, concept, description, group)
const VARIABLES: &[(&str, &str, &str, &str, &str)] = &[
    (
        "B01001_001E",
        "Total Population",
        "SEX BY AGE",
        "Total population count",
        "B01001",
    ),
    (
        "B01002_001E",
        "Median Age",
        "MEDIAN AGE BY SEX",
        "Median age of total population",
        "B01002",
    ),
    (
        "B02001_001E",
        "Total Race Population",
        "RACE",
        "Total population count for race estimates",
        "B02001",
    ),
    (
        "B19013_001E",
        "Median Household Income",
        "MEDIAN HOUSEHOLD INCOME IN THE PAST 12 MONTHS",
        "Median household income in the past 12 months (in inflation-adjusted dollars)",
        "B19013",
    ),
];

/// (name, description, required ancestors, wildcard)
const GEOGRAPHY_LEVELS: &[(&str, &str, &[&str], bool)] = &[
    ("state", "States and Equivalents", &["county", "tract", "block"], true),
    ("county", "Counties and Equivalents", &["tract", "block"], true),
    ("tract", "Census Tracts", &["block"], true),
    ("block", "Census Blocks", &[], true),
    ("us", "United States", &[], false),
];

/// (NAME, B01001_001E, B19013_001E, state)
const CUSTOM_ROWS: &[(&str, &str, &str, &str)] = &[
    ("California", "39538223", "78672", "06"),
    ("New York", "20201249", "71117", "36"),
    ("Texas", "29145505", "63826", "48"),
];

/// Census provider backed by static sample tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockCensusClient;

impl MockCensusClient {
    pub fn new() -> Self {
        Self
    }
}

fn all_states() -> Vec<PopulationRecord> {
    STATES
        .iter()
        .map(|(name, population, state)| PopulationRecord::state(*name, *population, *state))
        .collect()
}

fn all_counties() -> Vec<PopulationRecord> {
    COUNTIES
        .iter()
        .map(|(name, population, state, county)| {
            PopulationRecord::county(*name, *population, *state, *county)
        })
        .collect()
}

fn custom_rows() -> Vec<CustomQueryRow> {
    CUSTOM_ROWS
        .iter()
        .map(|(name, population, income, state)| {
            [
                ("NAME", *name),
                ("B01001_001E", *population),
                ("B19013_001E", *income),
                ("state", *state),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
        })
        .collect()
}

/// First record when nothing matched.
fn or_first(matches: Vec<PopulationRecord>, table: Vec<PopulationRecord>) -> Vec<PopulationRecord> {
    if matches.is_empty() {
        table.into_iter().take(1).collect()
    } else {
        matches
    }
}

#[async_trait]
impl CensusProvider for MockCensusClient {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    async fn get_state_population(&self, state_id: &str) -> Result<Vec<PopulationRecord>> {
        debug!(state_id = state_id, "Mock state population");

        let states = all_states();
        if state_id.is_empty() {
            return Ok(states);
        }

        let matches = states
            .iter()
            .filter(|s| s.state.as_deref() == Some(state_id))
            .take(1)
            .cloned()
            .collect();
        Ok(or_first(matches, states))
    }

    async fn get_county_population(&self, state_id: &str) -> Result<Vec<PopulationRecord>> {
        debug!(state_id = state_id, "Mock county population");

        let counties = all_counties();
        if state_id.is_empty() {
            return Ok(counties);
        }

        let matches = counties
            .iter()
            .filter(|c| c.state.as_deref() == Some(state_id))
            .cloned()
            .collect();
        Ok(or_first(matches, counties))
    }

    async fn search_state_by_name(&self, name: &str) -> Result<Vec<PopulationRecord>> {
        debug!(name = name, "Mock state search");

        Ok(all_states()
            .into_iter()
            .filter(|s| s.name_contains(name))
            .collect())
    }

    async fn get_available_datasets(&self) -> Result<Vec<DatasetDescriptor>> {
        Ok(DATASETS
            .iter()
            .map(|(id, title, description, years)| DatasetDescriptor {
                title: title.to_string(),
                description: description.to_string(),
                dataset_id: id.to_string(),
                years: years.iter().map(|y| y.to_string()).collect(),
            })
            .collect())
    }

    async fn get_variables(&self, dataset: &str, year: &str) -> Result<VariableMap> {
        require_dataset_and_year(dataset, year)?;

        Ok(VARIABLES
            .iter()
            .map(|(code, label, concept, description, group)| {
                let variable = VariableDescriptor {
                    code: code.to_string(),
                    label: label.to_string(),
                    description: Some(description.to_string()),
                    concept: Some(concept.to_string()),
                    group: Some(group.to_string()),
                };
                (code.to_string(), variable)
            })
            .collect())
    }

    async fn get_geography_levels(
        &self,
        dataset: &str,
        year: &str,
    ) -> Result<Vec<GeographyLevelDescriptor>> {
        require_dataset_and_year(dataset, year)?;

        Ok(GEOGRAPHY_LEVELS
            .iter()
            .map(|(name, description, required, wildcard)| GeographyLevelDescriptor {
                name: name.to_string(),
                description: description.to_string(),
                required_ancestors: required.iter().map(|r| r.to_string()).collect(),
                supports_wildcard: *wildcard,
            })
            .collect())
    }

    async fn get_custom_data(&self, spec: &CustomQuerySpec) -> Result<Vec<CustomQueryRow>> {
        spec.validate()?;
        spec.target_filter()?;
        debug!(
            dataset = spec.dataset.as_str(),
            geo_level = spec.geo_level.as_str(),
            "Mock custom data"
        );

        let keep = |column: &String| {
            column == "NAME" || *column == spec.geo_level || spec.variables.contains(column)
        };

        Ok(custom_rows()
            .into_iter()
            .map(|row| row.into_iter().filter(|(k, _)| keep(k)).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_population_all_and_by_id() {
        let mock = MockCensusClient::new();

        let all = mock.get_state_population("").await.unwrap();
        assert_eq!(all.len(), 6);

        let texas = mock.get_state_population("48").await.unwrap();
        assert_eq!(texas.len(), 1);
        assert_eq!(texas[0].name, "Texas");
    }

    #[tokio::test]
    async fn test_unknown_ids_fall_back_to_first_entry() {
        let mock = MockCensusClient::new();

        let state = mock.get_state_population("99").await.unwrap();
        assert_eq!(state.len(), 1);
        assert_eq!(state[0].name, "Alabama");

        let county = mock.get_county_population("99").await.unwrap();
        assert_eq!(county.len(), 1);
        assert_eq!(county[0].name, "Los Angeles County");
    }

    #[tokio::test]
    async fn test_county_population_filters_by_state() {
        let mock = MockCensusClient::new();

        let california = mock.get_county_population("06").await.unwrap();
        assert_eq!(california.len(), 3);
        assert!(california.iter().all(|c| c.state.as_deref() == Some("06")));

        let all = mock.get_county_population("").await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_search_state_by_name() {
        let mock = MockCensusClient::new();

        let upper = mock.search_state_by_name("CALIFORNIA").await.unwrap();
        let lower = mock.search_state_by_name("california").await.unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.len(), 1);

        assert_eq!(mock.search_state_by_name("").await.unwrap().len(), 6);
        let with_a = mock.search_state_by_name("a").await.unwrap();
        assert_eq!(with_a.len(), 5);
        assert!(with_a.iter().all(|s| s.name != "New York"));
        assert!(mock.search_state_by_name("Atlantis").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metadata_requires_dataset_and_year() {
        let mock = MockCensusClient::new();

        assert!(mock.get_variables("", "2021").await.unwrap_err().is_validation());
        assert!(mock
            .get_geography_levels("acs/acs1", "")
            .await
            .unwrap_err()
            .is_validation());

        let variables = mock.get_variables("acs/acs1", "2021").await.unwrap();
        assert_eq!(variables.len(), 4);
        assert_eq!(variables["B19013_001E"].label, "Median Household Income");

        let levels = mock.get_geography_levels("acs/acs1", "2021").await.unwrap();
        assert_eq!(levels.len(), 5);
        assert!(!levels[4].supports_wildcard);
    }

    #[tokio::test]
    async fn test_custom_data_keeps_requested_columns() {
        let mock = MockCensusClient::new();
        let spec = CustomQuerySpec::new(
            vec!["NAME".into(), "B19013_001E".into()],
            "acs/acs1",
            "2021",
            "state",
        );

        let rows = mock.get_custom_data(&spec).await.unwrap();
        assert_eq!(rows.len(), 3);
        let columns: Vec<&String> = rows[0].keys().collect();
        assert_eq!(columns, vec!["B19013_001E", "NAME", "state"]);
        assert_eq!(rows[2]["B19013_001E"], "63826");
    }

    #[tokio::test]
    async fn test_custom_data_validates() {
        let mock = MockCensusClient::new();
        let spec = CustomQuerySpec::new(vec![], "acs/acs1", "2021", "state");
        assert!(mock.get_custom_data(&spec).await.unwrap_err().is_validation());

        let mut no_target = CustomQuerySpec::new(vec!["NAME".into()], "acs/acs1", "2021", "county");
        no_target.geo_filters.clear();
        no_target.geo_filters.insert("state".into(), "06".into());
        let err = mock.get_custom_data(&no_target).await.unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("county"));
    }
}
