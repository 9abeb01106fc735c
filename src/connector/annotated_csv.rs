//! Annotated CSV decoding
//!
//! Flux query responses are CSV with annotation rows (`#datatype`, `#group`,
//! `#default`) ahead of each header. A new annotation block starts a new
//! header; a change in the `table` column starts a new table.
//!
//! ```text
//! #datatype,string,long,dateTime:RFC3339,double,string
//! #group,false,false,false,false,true
//! #default,_result,,,,
//! ,result,table,_time,_value,_field
//! ,,0,2024-01-01T00:00:00Z,42,value
//! ```

use super::error::{ConnectorError, ConnectorResult};
use crate::flux::{FluxRecord, FluxTable};
use chrono::DateTime;

/// Decode an annotated CSV response into result tables
pub fn parse_annotated_csv(body: &str) -> ConnectorResult<Vec<FluxTable>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut datatypes: Vec<String> = Vec::new();
    let mut defaults: Vec<String> = Vec::new();
    let mut header: Option<Vec<String>> = None;
    let mut tables: Vec<FluxTable> = Vec::new();
    let mut current_table: Option<(String, String)> = None;

    for record in reader.records() {
        let record = record?;
        let first = record.get(0).unwrap_or("");

        if first.starts_with('#') {
            let values: Vec<String> = record.iter().map(str::to_string).collect();
            match first {
                "#datatype" => {
                    datatypes = values;
                    header = None;
                    current_table = None;
                }
                "#default" => defaults = values,
                _ => {}
            }
            continue;
        }

        if record.iter().all(|v| v.trim().is_empty()) {
            header = None;
            continue;
        }

        if header.is_none() {
            header = Some(record.iter().map(|v| v.trim().to_string()).collect());
            continue;
        }
        let columns = match &header {
            Some(columns) => columns,
            None => continue,
        };

        let cell = |name: &str| -> Option<(usize, String)> {
            let index = columns.iter().position(|c| c == name)?;
            let raw = record.get(index).unwrap_or("");
            let raw = if raw.is_empty() {
                defaults.get(index).map(String::as_str).unwrap_or("")
            } else {
                raw
            };
            Some((index, raw.to_string()))
        };

        if let Some((_, message)) = cell("error") {
            let reference = cell("reference").map(|(_, r)| r).unwrap_or_default();
            return Err(ConnectorError::Backend(if reference.is_empty() {
                message
            } else {
                format!("{} (reference {})", message, reference)
            }));
        }

        let table_key = (
            cell("result").map(|(_, v)| v).unwrap_or_default(),
            cell("table").map(|(_, v)| v).unwrap_or_default(),
        );
        if current_table.as_ref() != Some(&table_key) {
            tables.push(FluxTable::default());
            current_table = Some(table_key);
        }

        let time = cell("_time")
            .map(|(_, t)| t)
            .filter(|t| DateTime::parse_from_rfc3339(t).is_ok());
        let field = cell("_field").map(|(_, f)| f).unwrap_or_default();
        let value = match cell("_value") {
            Some((index, raw)) => typed_value(&raw, datatypes.get(index).map(String::as_str)),
            None => serde_json::Value::Null,
        };

        if let Some(table) = tables.last_mut() {
            table.records.push(FluxRecord::new(time, field, value));
        }
    }

    Ok(tables)
}

fn typed_value(raw: &str, datatype: Option<&str>) -> serde_json::Value {
    if raw.is_empty() {
        return serde_json::Value::Null;
    }

    match datatype.unwrap_or("string") {
        "long" => raw
            .parse::<i64>()
            .map(serde_json::Value::from)
            .unwrap_or(serde_json::Value::Null),
        "unsignedLong" => raw
            .parse::<u64>()
            .map(serde_json::Value::from)
            .unwrap_or(serde_json::Value::Null),
        "double" => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        "boolean" => serde_json::Value::Bool(raw == "true"),
        _ => serde_json::Value::String(raw.to_string()),
    }
}
