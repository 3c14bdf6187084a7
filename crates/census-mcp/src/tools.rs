//! MCP tool registry.
//!
//! Every tool is declared once here. The parameter list doubles as the
//! argument mapping table used by [`crate::arguments`] and as the source of
//! the JSON schema published by `tools/list`.

use serde_json::{json, Map, Value};

use crate::protocol::ToolDefinition;

pub const GET_STATE_POPULATION: &str = "get_state_population";
pub const GET_COUNTY_POPULATION: &str = "get_county_population";
pub const SEARCH_STATE_BY_NAME: &str = "search_state_by_name";
pub const GET_AVAILABLE_DATASETS: &str = "get_available_datasets";
pub const GET_VARIABLES: &str = "get_variables";
pub const GET_GEOGRAPHY_LEVELS: &str = "get_geography_levels";
pub const GET_CUSTOM_DATA: &str = "get_custom_data";

/// JSON type of a tool argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    /// Array of strings.
    Array,
    /// Object with string values.
    Object,
}

/// One tool argument.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

/// One tool: name, description and arguments.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

const STATE_ID: ParamSpec = ParamSpec {
    name: "stateID",
    kind: ParamKind::String,
    required: false,
    description: "State FIPS code (e.g. '06' for California). Omit for every state.",
};

const DATASET: ParamSpec = ParamSpec {
    name: "dataset",
    kind: ParamKind::String,
    required: true,
    description: "Dataset path (e.g. 'acs/acs1')",
};

const YEAR: ParamSpec = ParamSpec {
    name: "year",
    kind: ParamKind::String,
    required: true,
    description: "Dataset vintage (e.g. '2021')",
};

/// Every tool the server exposes, in `tools/list` order.
pub static TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: GET_STATE_POPULATION,
        description: "Get the population of a U.S. state, or of every state when stateID is omitted",
        params: &[STATE_ID],
    },
    ToolSpec {
        name: GET_COUNTY_POPULATION,
        description: "Get the population of the counties of a U.S. state, or of every county when stateID is omitted",
        params: &[ParamSpec {
            description: "State FIPS code (e.g. '06' for California). Omit for every county.",
            ..STATE_ID
        }],
    },
    ToolSpec {
        name: SEARCH_STATE_BY_NAME,
        description: "Find states whose name contains the given text (case-insensitive)",
        params: &[ParamSpec {
            name: "name",
            kind: ParamKind::String,
            required: true,
            description: "Full or partial state name",
        }],
    },
    ToolSpec {
        name: GET_AVAILABLE_DATASETS,
        description: "List the datasets published by the Census API",
        params: &[],
    },
    ToolSpec {
        name: GET_VARIABLES,
        description: "List the variables of a dataset vintage",
        params: &[DATASET, YEAR],
    },
    ToolSpec {
        name: GET_GEOGRAPHY_LEVELS,
        description: "List the geography levels of a dataset vintage",
        params: &[DATASET, YEAR],
    },
    ToolSpec {
        name: GET_CUSTOM_DATA,
        description: "Run a custom Census API query with a dataset, year, variables and geography level",
        params: &[
            DATASET,
            YEAR,
            ParamSpec {
                name: "geoLevel",
                kind: ParamKind::String,
                required: true,
                description: "Geography level (e.g. 'state' or 'county')",
            },
            ParamSpec {
                name: "variables",
                kind: ParamKind::Array,
                required: true,
                description: "Variables to fetch (e.g. ['NAME', 'B01001_001E'])",
            },
            ParamSpec {
                name: "geoFilter",
                kind: ParamKind::Object,
                required: false,
                description: "Geography filter (e.g. {\"state\": \"06\", \"county\": \"*\"}). Defaults to every entity at geoLevel.",
            },
        ],
    },
];

impl ParamSpec {
    fn schema(&self) -> Value {
        match self.kind {
            ParamKind::String => json!({
                "type": "string",
                "description": self.description,
            }),
            ParamKind::Array => json!({
                "type": "array",
                "items": { "type": "string" },
                "description": self.description,
            }),
            ParamKind::Object => json!({
                "type": "object",
                "additionalProperties": { "type": "string" },
                "description": self.description,
            }),
        }
    }
}

impl ToolSpec {
    /// JSON schema of the tool arguments.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    /// Definition for the `tools/list` response.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Look up a tool by name.
pub fn find(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|tool| tool.name == name)
}

/// Definitions of every tool.
pub fn definitions() -> Vec<ToolDefinition> {
    TOOLS.iter().map(ToolSpec::definition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seven_unique_tools() {
        let names: std::collections::HashSet<_> = TOOLS.iter().map(|t| t.name).collect();
        assert_eq!(TOOLS.len(), 7);
        assert_eq!(names.len(), 7);
    }

    #[test]
    fn test_custom_data_schema() {
        let schema = find(GET_CUSTOM_DATA).unwrap().input_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(
            schema["required"],
            json!(["dataset", "year", "geoLevel", "variables"])
        );
        assert_eq!(schema["properties"]["variables"]["type"], "array");
        assert_eq!(schema["properties"]["variables"]["items"]["type"], "string");
        assert_eq!(schema["properties"]["geoFilter"]["type"], "object");
    }

    #[test]
    fn test_optional_only_schema_has_no_required() {
        let schema = find(GET_STATE_POPULATION).unwrap().input_schema();
        assert!(schema.get("required").is_none());
        assert_eq!(schema["properties"]["stateID"]["type"], "string");

        let datasets = find(GET_AVAILABLE_DATASETS).unwrap().input_schema();
        assert_eq!(datasets["properties"], json!({}));
    }

    #[test]
    fn test_find_unknown() {
        assert!(find("get_issues").is_none());
    }

    #[test]
    fn test_definitions_use_camel_case_schema_key() {
        let json = serde_json::to_value(definitions()).unwrap();
        assert!(json[0].get("inputSchema").is_some());
    }
}
