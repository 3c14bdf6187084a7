//! Offline demonstration run by `census --test`.

use std::io::Write;

use census_core::{CensusProvider, CustomQuerySpec, Result};
use census_mcp::tools;
use census_pipeline::{CensusData, Formatter};
use serde_json::json;
use tracing::{error, info};

const DEMO_DATASET: &str = "acs/acs1";
const DEMO_YEAR: &str = "2021";
const DEMO_SEARCH: &str = "york";
const SHOWN_STATES: usize = 3;

/// Exercise every provider operation and print the formatted results.
///
/// Provider failures are printed and the script moves on; only write
/// errors abort it.
pub async fn run(
    provider: &dyn CensusProvider,
    formatter: &Formatter,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    info!(provider = provider.provider_name(), "Running demonstration");

    section(out, "State population")?;
    let states = provider.get_state_population("").await.map(|mut states| {
        states.truncate(SHOWN_STATES);
        states
    });
    show(out, formatter, states)?;

    section(out, &format!("Search states by name: \"{}\"", DEMO_SEARCH))?;
    show(out, formatter, provider.search_state_by_name(DEMO_SEARCH).await)?;

    section(out, "Available datasets")?;
    show(out, formatter, provider.get_available_datasets().await)?;

    section(out, &format!("Variables of {} {}", DEMO_DATASET, DEMO_YEAR))?;
    show(
        out,
        formatter,
        provider.get_variables(DEMO_DATASET, DEMO_YEAR).await,
    )?;

    section(out, &format!("Geography levels of {} {}", DEMO_DATASET, DEMO_YEAR))?;
    show(
        out,
        formatter,
        provider.get_geography_levels(DEMO_DATASET, DEMO_YEAR).await,
    )?;

    section(out, "Custom query")?;
    let spec = CustomQuerySpec::new(
        vec![
            "NAME".to_string(),
            "B01001_001E".to_string(),
            "B19013_001E".to_string(),
        ],
        DEMO_DATASET,
        DEMO_YEAR,
        "state",
    );
    show(out, formatter, provider.get_custom_data(&spec).await)?;

    section(out, "Sample tool calls")?;
    for request in sample_requests() {
        writeln!(out, "{}", request)?;
    }

    Ok(())
}

fn section(out: &mut impl Write, title: &str) -> std::io::Result<()> {
    writeln!(out, "=== {} ===", title)
}

fn show<T: Into<CensusData>>(
    out: &mut impl Write,
    formatter: &Formatter,
    result: Result<T>,
) -> std::io::Result<()> {
    match result {
        Ok(data) => writeln!(out, "{}\n", formatter.format(&data.into())),
        Err(e) => {
            error!(error = %e, "Demonstration step failed");
            writeln!(out, "Error: {}\n", e)
        }
    }
}

/// `tools/call` requests a client could send for each tool.
fn sample_requests() -> Vec<serde_json::Value> {
    let calls = [
        (tools::GET_STATE_POPULATION, json!({"stateID": "06"})),
        (tools::GET_COUNTY_POPULATION, json!({"stateID": "06"})),
        (tools::SEARCH_STATE_BY_NAME, json!({"name": "york"})),
        (tools::GET_AVAILABLE_DATASETS, json!({})),
        (
            tools::GET_VARIABLES,
            json!({"dataset": DEMO_DATASET, "year": DEMO_YEAR}),
        ),
        (
            tools::GET_GEOGRAPHY_LEVELS,
            json!({"dataset": DEMO_DATASET, "year": DEMO_YEAR}),
        ),
        (
            tools::GET_CUSTOM_DATA,
            json!({
                "dataset": DEMO_DATASET,
                "year": DEMO_YEAR,
                "geoLevel": "county",
                "variables": ["NAME", "B01001_001E"],
                "geoFilter": {"state": "06", "county": "*"}
            }),
        ),
    ];

    calls
        .into_iter()
        .enumerate()
        .map(|(i, (name, arguments))| {
            json!({
                "jsonrpc": "2.0",
                "id": i + 1,
                "method": "tools/call",
                "params": {"name": name, "arguments": arguments}
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use census_api::MockCensusClient;
    use census_mcp::ToolHandler;

    async fn demo_output() -> String {
        let mut out = Vec::new();
        run(&MockCensusClient::new(), &Formatter::new(), &mut out)
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_demo_shows_first_states_only() {
        let output = demo_output().await;

        assert!(output.contains("Alabama (state 01)"));
        assert!(output.contains("Arizona (state 04)"));
        assert!(!output.contains("| California (state 06) |"));
    }

    #[tokio::test]
    async fn test_demo_covers_every_operation() {
        let output = demo_output().await;

        assert!(output.contains("New York (state 36)"));
        assert!(output.contains("# Available Datasets"));
        assert!(output.contains("## B19013_001E"));
        assert!(output.contains("## county"));
        assert!(output.contains("| 78672 |"));
        assert!(!output.contains("Error:"));
    }

    #[tokio::test]
    async fn test_demo_prints_sample_calls() {
        let output = demo_output().await;

        let requests: Vec<serde_json::Value> = output
            .lines()
            .filter(|line| line.starts_with('{'))
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(requests.len(), 7);
        assert_eq!(requests[6]["params"]["name"], "get_custom_data");
        assert!(requests.iter().all(|r| r["method"] == "tools/call"));
    }

    #[tokio::test]
    async fn test_sample_calls_succeed() {
        let handler = ToolHandler::new(Arc::new(MockCensusClient::new()));

        for request in sample_requests() {
            let params = &request["params"];
            let name = params["name"].as_str().unwrap();
            let result = handler.execute(name, Some(params["arguments"].clone())).await;

            assert!(
                !result.is_error(),
                "{} failed: {}",
                name,
                result.text_content()
            );
        }
    }
}
