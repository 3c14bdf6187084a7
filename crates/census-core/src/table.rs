//! Decoding of the Census tabular response convention.
//!
//! Data endpoints answer with a JSON array of rows. Row 0 holds the column
//! names and every following row holds values in the same order.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::CustomQueryRow;

/// Parsed header plus data rows, before zipping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parse a response body into header and data rows.
    ///
    /// Fails with [`Error::Decode`] when the body is not an array of arrays
    /// of scalars, and with [`Error::EmptyResult`] when there is no data row.
    pub fn parse(body: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| Error::Decode(e.to_string()))?;

        let Value::Array(outer) = value else {
            return Err(Error::Decode("expected an array of rows".to_string()));
        };

        let mut rows = outer
            .into_iter()
            .enumerate()
            .map(|(index, row)| parse_row(index, row))
            .collect::<Result<Vec<_>>>()?;

        if rows.len() < 2 {
            return Err(Error::EmptyResult);
        }

        let headers = rows.remove(0);
        Ok(Self { headers, rows })
    }

    /// Zip the header with every data row.
    pub fn into_records(self) -> Vec<CustomQueryRow> {
        zip_rows(&self.headers, self.rows)
    }
}

fn parse_row(index: usize, row: Value) -> Result<Vec<String>> {
    let Value::Array(cells) = row else {
        return Err(Error::Decode(format!("row {} is not an array", index)));
    };

    cells
        .into_iter()
        .map(|cell| match cell {
            Value::String(s) => Ok(s),
            Value::Null => Ok(String::new()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(Error::Decode(format!(
                "row {} contains a non-scalar cell: {}",
                index, other
            ))),
        })
        .collect()
}

/// Produce one mapping per data row whose length matches the header.
///
/// Rows with a different length are dropped, never treated as a failure.
pub fn zip_rows(headers: &[String], rows: Vec<Vec<String>>) -> Vec<CustomQueryRow> {
    let total = rows.len();
    let records: Vec<CustomQueryRow> = rows
        .into_iter()
        .filter(|row| row.len() == headers.len())
        .map(|row| headers.iter().cloned().zip(row).collect())
        .collect();

    if records.len() < total {
        warn!(
            dropped = total - records.len(),
            columns = headers.len(),
            "Skipped rows with mismatched length"
        );
    }
    debug!(rows = records.len(), "Decoded table rows");

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_zip_rows_all_valid() {
        let headers = strings(&["NAME", "B01001_001E", "state"]);
        let rows = vec![
            strings(&["Alabama", "5024279", "01"]),
            strings(&["Alaska", "733391", "02"]),
        ];

        let records = zip_rows(&headers, rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["NAME"], "Alabama");
        assert_eq!(records[1]["state"], "02");
    }

    #[test]
    fn test_zip_rows_drops_mismatched_rows() {
        let headers = strings(&["NAME", "state"]);
        let rows = vec![
            strings(&["Alabama", "01"]),
            strings(&["Broken"]),
            strings(&["Too", "many", "cells"]),
            strings(&["Texas", "48"]),
        ];

        let records = zip_rows(&headers, rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["NAME"], "Texas");
    }

    #[test]
    fn test_parse_header_and_rows() {
        let body = r#"[["NAME","B01001_001E","state"],["California","39538223","06"]]"#;
        let table = RawTable::parse(body).unwrap();
        assert_eq!(table.headers, strings(&["NAME", "B01001_001E", "state"]));
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn test_parse_stringifies_scalars() {
        let body = r#"[["NAME","B19013_001E","flag"],["Texas",63826,null]]"#;
        let records = RawTable::parse(body).unwrap().into_records();
        assert_eq!(records[0]["B19013_001E"], "63826");
        assert_eq!(records[0]["flag"], "");
    }

    #[test]
    fn test_parse_header_only_is_empty_result() {
        let body = r#"[["NAME","state"]]"#;
        assert!(matches!(RawTable::parse(body), Err(Error::EmptyResult)));
        assert!(matches!(RawTable::parse("[]"), Err(Error::EmptyResult)));
    }

    #[test]
    fn test_parse_wrong_shape_is_decode_error() {
        assert!(matches!(
            RawTable::parse(r#"{"error":"bad"}"#),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            RawTable::parse(r#"[["NAME"],"oops"]"#),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            RawTable::parse(r#"[["NAME"],[{"a":1}]]"#),
            Err(Error::Decode(_))
        ));
        assert!(matches!(RawTable::parse("not json"), Err(Error::Decode(_))));
    }
}
