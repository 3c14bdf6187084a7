//! Markdown rendering of Census results.
//!
//! Population and custom rows render as tables; metadata (datasets,
//! variables, geography levels) renders as one `##` section per entry.
//! Every renderer returns a fixed sentence for an empty collection.

use std::collections::BTreeSet;

use census_core::{
    CustomQueryRow, DatasetDescriptor, GeographyLevelDescriptor, PopulationRecord, VariableMap,
};

/// Placeholder for a column a custom row does not carry.
pub const MISSING_CELL: &str = "N/A";

pub const NO_POPULATION: &str = "No population data available.";
pub const NO_DATASETS: &str = "No dataset information available.";
pub const NO_VARIABLES: &str = "No variable information available.";
pub const NO_GEOGRAPHY_LEVELS: &str = "No geography level information available.";
pub const NO_ROWS: &str = "No data available.";

// ============================================================================
// Population
// ============================================================================

/// Convert population records to a two-column table.
pub fn population_to_markdown(records: &[PopulationRecord]) -> String {
    if records.is_empty() {
        return NO_POPULATION.to_string();
    }

    let mut output = String::new();
    output.push_str("| Region | Population |\n");
    output.push_str("|--------|------------|\n");

    for record in records {
        output.push_str(&format!(
            "| {} | {} |\n",
            region_label(record),
            record.population
        ));
    }

    output
}

/// "<name> (county C, state S)" for counties, "<name> (state S)" otherwise.
pub fn region_label(record: &PopulationRecord) -> String {
    let state = record.state.as_deref().unwrap_or_default();
    match &record.county {
        Some(county) => format!("{} (county {}, state {})", record.name, county, state),
        None => format!("{} (state {})", record.name, state),
    }
}

// ============================================================================
// Datasets
// ============================================================================

/// Convert catalog datasets to Markdown sections.
pub fn datasets_to_markdown(datasets: &[DatasetDescriptor]) -> String {
    if datasets.is_empty() {
        return NO_DATASETS.to_string();
    }

    let mut output = String::new();
    output.push_str("# Available Datasets\n\n");

    for dataset in datasets {
        output.push_str(&format!("## {}\n", dataset.title));
        output.push_str(&format!("- **Dataset ID**: {}\n", dataset.dataset_id));
        output.push_str(&format!("- **Description**: {}\n", dataset.description));

        let years = if dataset.years.is_empty() {
            "no information".to_string()
        } else {
            dataset.years.join(", ")
        };
        output.push_str(&format!("- **Available years**: {}\n\n", years));
    }

    output
}

// ============================================================================
// Variables
// ============================================================================

/// Convert a variable map to Markdown sections, sorted by variable code.
pub fn variables_to_markdown(variables: &VariableMap) -> String {
    if variables.is_empty() {
        return NO_VARIABLES.to_string();
    }

    let mut codes: Vec<&String> = variables.keys().collect();
    codes.sort();

    let mut output = String::new();
    output.push_str("# Available Variables\n\n");

    for code in codes {
        let variable = &variables[code];
        output.push_str(&format!("## {}: {}\n", code, variable.label));

        for (field, value) in [
            ("Description", &variable.description),
            ("Concept", &variable.concept),
            ("Group", &variable.group),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                output.push_str(&format!("- **{}**: {}\n", field, value));
            }
        }

        output.push('\n');
    }

    output
}

// ============================================================================
// Geography levels
// ============================================================================

/// Convert geography levels to Markdown sections, in the order given.
pub fn geography_levels_to_markdown(levels: &[GeographyLevelDescriptor]) -> String {
    if levels.is_empty() {
        return NO_GEOGRAPHY_LEVELS.to_string();
    }

    let mut output = String::new();
    output.push_str("# Available Geography Levels\n\n");

    for level in levels {
        output.push_str(&format!("## {}\n", level.name));
        output.push_str(&format!("- **Description**: {}\n", level.description));

        if !level.required_ancestors.is_empty() {
            output.push_str(&format!(
                "- **Requires**: {}\n",
                level.required_ancestors.join(", ")
            ));
        }

        output.push_str(&format!(
            "- **Wildcard support**: {}\n\n",
            level.supports_wildcard
        ));
    }

    output
}

// ============================================================================
// Custom rows
// ============================================================================

/// Convert custom query rows to a table over the sorted union of columns.
pub fn custom_rows_to_markdown(rows: &[CustomQueryRow]) -> String {
    let columns: BTreeSet<&String> = rows.iter().flat_map(|row| row.keys()).collect();
    if columns.is_empty() {
        return NO_ROWS.to_string();
    }

    let mut output = String::new();

    output.push('|');
    for column in &columns {
        output.push_str(&format!(" {} |", column));
    }
    output.push('\n');

    output.push('|');
    for _ in &columns {
        output.push_str(" --- |");
    }
    output.push('\n');

    for row in rows {
        output.push('|');
        for column in &columns {
            let cell = row.get(*column).map(String::as_str).unwrap_or(MISSING_CELL);
            output.push_str(&format!(" {} |", cell));
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use census_core::VariableDescriptor;

    fn row(pairs: &[(&str, &str)]) -> CustomQueryRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_population_table() {
        let records = vec![
            PopulationRecord::state("California", "39538223", "06"),
            PopulationRecord::county("Harris County", "4713325", "48", "201"),
        ];

        let md = population_to_markdown(&records);
        assert!(md.starts_with("| Region | Population |\n"));
        assert!(md.contains("| California (state 06) | 39538223 |"));
        assert!(md.contains("| Harris County (county 201, state 48) | 4713325 |"));
    }

    #[test]
    fn test_empty_collections_render_sentences() {
        assert_eq!(population_to_markdown(&[]), NO_POPULATION);
        assert_eq!(datasets_to_markdown(&[]), NO_DATASETS);
        assert_eq!(variables_to_markdown(&VariableMap::new()), NO_VARIABLES);
        assert_eq!(geography_levels_to_markdown(&[]), NO_GEOGRAPHY_LEVELS);
        assert_eq!(custom_rows_to_markdown(&[]), NO_ROWS);
        assert_eq!(custom_rows_to_markdown(&[CustomQueryRow::new()]), NO_ROWS);
    }

    #[test]
    fn test_datasets_sections() {
        let datasets = vec![DatasetDescriptor {
            title: "Decennial Census".into(),
            description: "Complete count".into(),
            dataset_id: "dec/sf1".into(),
            years: vec!["2000".into(), "2010".into()],
        }];

        let md = datasets_to_markdown(&datasets);
        assert!(md.contains("## Decennial Census\n"));
        assert!(md.contains("- **Dataset ID**: dec/sf1\n"));
        assert!(md.contains("- **Available years**: 2000, 2010\n"));
    }

    #[test]
    fn test_variables_sorted_and_optional_fields() {
        let mut variables = VariableMap::new();
        variables.insert(
            "B".into(),
            VariableDescriptor {
                code: "B".into(),
                label: "Second".into(),
                concept: Some("RACE".into()),
                ..Default::default()
            },
        );
        variables.insert(
            "A".into(),
            VariableDescriptor {
                code: "A".into(),
                label: "First".into(),
                description: Some(String::new()),
                ..Default::default()
            },
        );

        let md = variables_to_markdown(&variables);
        let a = md.find("## A: First").unwrap();
        let b = md.find("## B: Second").unwrap();
        assert!(a < b);
        assert!(md.contains("- **Concept**: RACE"));
        assert!(!md.contains("**Description**"));
        assert!(!md.contains("**Group**"));
    }

    #[test]
    fn test_geography_levels_sections() {
        let levels = vec![
            GeographyLevelDescriptor {
                name: "county".into(),
                description: "Counties".into(),
                required_ancestors: vec!["state".into()],
                supports_wildcard: true,
            },
            GeographyLevelDescriptor {
                name: "us".into(),
                description: "United States".into(),
                required_ancestors: vec![],
                supports_wildcard: false,
            },
        ];

        let md = geography_levels_to_markdown(&levels);
        assert!(md.contains("- **Requires**: state\n- **Wildcard support**: true"));
        assert!(md.contains("## us\n- **Description**: United States\n- **Wildcard support**: false"));
        assert_eq!(md.matches("**Requires**").count(), 1);
    }

    #[test]
    fn test_custom_rows_union_of_columns() {
        let rows = vec![
            row(&[("NAME", "California"), ("state", "06")]),
            row(&[("NAME", "Texas"), ("B01001_001E", "29145505")]),
        ];

        let md = custom_rows_to_markdown(&rows);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| B01001_001E | NAME | state |");
        assert_eq!(lines[1], "| --- | --- | --- |");
        assert_eq!(lines[2], "| N/A | California | 06 |");
        assert_eq!(lines[3], "| 29145505 | Texas | N/A |");
    }
}
