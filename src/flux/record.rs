//! Query result records
//!
//! Flux returns one record per (time, field) pair. Callers want one row per
//! instant, so records are folded into rows keyed by their time value.

use crate::schema::Row;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One record of a Flux result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxRecord {
    /// `_time` column, if present and valid
    pub time: Option<String>,
    /// `_field` column
    pub field: String,
    /// `_value` column
    pub value: serde_json::Value,
}

impl FluxRecord {
    /// Create a record
    pub fn new(time: Option<String>, field: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            time,
            field: field.into(),
            value,
        }
    }
}

/// One result table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FluxTable {
    /// Records, in response order
    pub records: Vec<FluxRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Time(String),
    /// Records without a usable time share one row
    Untimed,
}

/// Fold records into rows, one per distinct time, in first-seen order
///
/// Each row has a `time` column plus one column per field. Records without a
/// valid time are kept in a single row without a `time` column. Returns the
/// rows and the number of untimed records.
pub fn collect_rows(tables: &[FluxTable]) -> (Vec<Row>, usize) {
    let mut rows: Vec<Row> = Vec::new();
    let mut positions: HashMap<GroupKey, usize> = HashMap::new();
    let mut untimed = 0;

    for record in tables.iter().flat_map(|table| table.records.iter()) {
        let key = match record.time.as_deref().map(str::trim) {
            Some(time) if !time.is_empty() => GroupKey::Time(time.to_string()),
            _ => {
                untimed += 1;
                GroupKey::Untimed
            }
        };

        let index = *positions.entry(key.clone()).or_insert_with(|| {
            let mut row = Row::new();
            if let GroupKey::Time(time) = &key {
                row.insert("time".to_string(), serde_json::Value::String(time.clone()));
            }
            rows.push(row);
            rows.len() - 1
        });

        rows[index].insert(record.field.clone(), record.value.clone());
    }

    (rows, untimed)
}
