//! Typed tool arguments.
//!
//! Tool calls carry an untyped JSON object. Each tool gets a request struct
//! parsed from it leniently: a missing field, a field of the wrong JSON
//! type, or a non-object `arguments` value all read as "absent". Parsing
//! never fails; required-field checks happen afterwards via `missing()`.
//!
//! | Tool | Argument | JSON type | Required |
//! |---|---|---|---|
//! | `get_state_population`, `get_county_population` | `stateID` | string | no |
//! | `search_state_by_name` | `name` | string | yes |
//! | `get_variables`, `get_geography_levels` | `dataset`, `year` | string | yes |
//! | `get_custom_data` | `dataset`, `year`, `geoLevel` | string | yes |
//! | `get_custom_data` | `variables` | array of strings | yes |
//! | `get_custom_data` | `geoFilter` | object of strings | no |

use std::collections::BTreeMap;

use census_core::{CustomQuerySpec, WILDCARD};
use serde_json::{Map, Value};

/// Read-only view of a tool's argument object.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentMap<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> ArgumentMap<'a> {
    pub fn new(arguments: Option<&'a Value>) -> Self {
        Self {
            fields: arguments.and_then(Value::as_object),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields.and_then(|fields| fields.get(key))
    }

    /// String field, or "" when absent or not a string.
    pub fn string(&self, key: &str) -> String {
        self.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// String elements of an array field; other elements are dropped.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// String entries of an object field, or `None` when it is not an object.
    pub fn string_map(&self, key: &str) -> Option<BTreeMap<String, String>> {
        self.get(key).and_then(Value::as_object).map(|entries| {
            entries
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
    }
}

/// Arguments of the two population tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationArgs {
    /// Empty means every state.
    pub state_id: String,
}

impl PopulationArgs {
    pub fn parse(args: ArgumentMap<'_>) -> Self {
        Self {
            state_id: args.string("stateID"),
        }
    }
}

/// Arguments of `search_state_by_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchArgs {
    pub name: String,
}

impl SearchArgs {
    pub fn parse(args: ArgumentMap<'_>) -> Self {
        Self {
            name: args.string("name"),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Arguments of `get_variables` and `get_geography_levels`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetArgs {
    pub dataset: String,
    pub year: String,
}

impl DatasetArgs {
    pub fn parse(args: ArgumentMap<'_>) -> Self {
        Self {
            dataset: args.string("dataset"),
            year: args.string("year"),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.dataset.is_empty() && !self.year.is_empty()
    }
}

/// Arguments of `get_custom_data`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomDataArgs {
    pub dataset: String,
    pub year: String,
    pub geo_level: String,
    pub variables: Vec<String>,
    pub geo_filter: Option<BTreeMap<String, String>>,
}

impl CustomDataArgs {
    pub fn parse(args: ArgumentMap<'_>) -> Self {
        Self {
            dataset: args.string("dataset"),
            year: args.string("year"),
            geo_level: args.string("geoLevel"),
            variables: args.string_list("variables"),
            geo_filter: args.string_map("geoFilter"),
        }
    }

    /// Names of the required arguments that are absent or empty.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.dataset.is_empty() {
            missing.push("dataset");
        }
        if self.year.is_empty() {
            missing.push("year");
        }
        if self.geo_level.is_empty() {
            missing.push("geoLevel");
        }
        if self.variables.is_empty() {
            missing.push("variables");
        }
        missing
    }

    /// Build the query. Without a `geoFilter` object every entity at
    /// `geoLevel` is selected.
    pub fn into_spec(self) -> CustomQuerySpec {
        let geo_filters = match self.geo_filter {
            Some(filter) => filter,
            None => BTreeMap::from([(self.geo_level.clone(), WILDCARD.to_string())]),
        };

        CustomQuerySpec {
            variables: self.variables,
            dataset: self.dataset,
            year: self.year,
            geo_level: self.geo_level,
            geo_filters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrong_types_read_as_absent() {
        let value = json!({"stateID": 6, "name": null, "dataset": ["acs"]});
        let args = ArgumentMap::new(Some(&value));

        assert_eq!(PopulationArgs::parse(args).state_id, "");
        assert!(!SearchArgs::parse(args).is_valid());
        assert!(!DatasetArgs::parse(args).is_valid());
    }

    #[test]
    fn test_non_object_arguments() {
        let value = json!("not an object");
        let args = ArgumentMap::new(Some(&value));
        assert_eq!(args.string("name"), "");

        let none = ArgumentMap::new(None);
        assert!(none.string_list("variables").is_empty());
        assert!(none.string_map("geoFilter").is_none());
    }

    #[test]
    fn test_variables_keep_strings_only() {
        let value = json!({"variables": ["NAME", 1, null, {"x": 1}, "B01001_001E"]});
        let args = CustomDataArgs::parse(ArgumentMap::new(Some(&value)));
        assert_eq!(args.variables, vec!["NAME", "B01001_001E"]);
    }

    #[test]
    fn test_missing_lists_every_absent_field() {
        let value = json!({"dataset": "acs/acs1", "variables": []});
        let args = CustomDataArgs::parse(ArgumentMap::new(Some(&value)));
        assert_eq!(args.missing(), vec!["year", "geoLevel", "variables"]);
    }

    #[test]
    fn test_into_spec_synthesizes_wildcard() {
        let value = json!({
            "dataset": "acs/acs1",
            "year": "2021",
            "geoLevel": "county",
            "variables": ["NAME"]
        });
        let spec = CustomDataArgs::parse(ArgumentMap::new(Some(&value))).into_spec();

        assert_eq!(spec.geo_filters.len(), 1);
        assert_eq!(spec.geo_filters["county"], "*");
    }

    #[test]
    fn test_into_spec_keeps_given_filter() {
        let value = json!({
            "dataset": "acs/acs1",
            "year": "2021",
            "geoLevel": "county",
            "variables": ["NAME"],
            "geoFilter": {"state": "06", "county": "*", "tract": 5}
        });
        let spec = CustomDataArgs::parse(ArgumentMap::new(Some(&value))).into_spec();

        assert_eq!(spec.geo_filters.len(), 2);
        assert_eq!(spec.geo_filters["state"], "06");
        assert_eq!(spec.geo_filters["county"], "*");
    }
}
