//! Line protocol rendering for time-series writes
//!
//! ```text
//! <measurement>[,<tag>=<value>...] [<field>=<value>,...] <timestamp>
//! ```
//!
//! Timestamps are epoch seconds. String field values are escaped and quoted;
//! numbers and booleans are emitted bare.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reserved row key carrying the timestamp
pub const TIME_KEY: &str = "time";

/// Reserved row key carrying the tag set
pub const TAGS_KEY: &str = "tags";

/// A field value in a written point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineValue {
    /// Boolean, emitted as `true`/`false`
    Bool(bool),
    /// Integer, emitted bare
    Int(i64),
    /// Float, emitted bare
    Float(f64),
    /// String, emitted quoted
    Text(String),
}

impl LineValue {
    /// Field-set representation of this value
    pub fn render(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => format!("\"{}\"", escape_string_value(s)),
        }
    }

    /// Whether the value can be written; NaN and infinities cannot
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Float(f) => f.is_finite(),
            _ => true,
        }
    }

    /// Convert a JSON scalar; nulls and non-finite numbers yield `None`,
    /// structures become text
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Self::Int(i)),
                None => n.as_f64().filter(|f| f.is_finite()).map(Self::Float),
            },
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            other => Some(Self::Text(other.to_string())),
        }
    }
}

impl From<f64> for LineValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<i64> for LineValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for LineValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for LineValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// One row to write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteRow {
    /// Explicit timestamp in epoch seconds
    pub time: Option<i64>,
    /// Tag set
    pub tags: BTreeMap<String, String>,
    /// Field set
    pub fields: BTreeMap<String, LineValue>,
}

impl WriteRow {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the timestamp
    pub fn time(mut self, seconds: i64) -> Self {
        self.time = Some(seconds);
        self
    }

    /// Builder method: add a tag
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Builder method: add a field; NaN and infinite floats are skipped
    pub fn field(mut self, key: impl Into<String>, value: impl Into<LineValue>) -> Self {
        let value = value.into();
        if value.is_writable() {
            self.fields.insert(key.into(), value);
        }
        self
    }

    /// Build a row from a JSON object
    ///
    /// `time` (epoch seconds or RFC3339) and `tags` (object) are extracted;
    /// every other non-null key becomes a field. Non-objects yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut row = WriteRow::new();

        for (key, value) in object {
            match key.as_str() {
                TIME_KEY => row.time = parse_time(value),
                TAGS_KEY if value.is_object() => {
                    if let Some(tags) = value.as_object() {
                        for (tag, v) in tags {
                            let v = match v {
                                serde_json::Value::String(s) => s.clone(),
                                other => other.to_string(),
                            };
                            row.tags.insert(tag.clone(), v);
                        }
                    }
                }
                _ => {
                    if let Some(v) = LineValue::from_json(value) {
                        row.fields.insert(key.clone(), v);
                    }
                }
            }
        }

        Some(row)
    }
}

fn parse_time(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s.trim()).ok().map(|dt| dt.timestamp())),
        _ => None,
    }
}

/// Render one row; rows without a time use `now` (epoch seconds)
pub fn render_line(measurement: &str, row: &WriteRow, now: i64) -> String {
    let mut head = escape_measurement(measurement);
    for (tag, value) in &row.tags {
        head.push(',');
        head.push_str(&escape_key(tag));
        head.push('=');
        head.push_str(&escape_key(value));
    }

    let mut payload = vec![head];

    let fields: Vec<String> = row
        .fields
        .iter()
        .filter(|(_, value)| value.is_writable())
        .map(|(key, value)| format!("{}={}", escape_key(key), value.render()))
        .collect();
    if !fields.is_empty() {
        payload.push(fields.join(","));
    }

    payload.push(row.time.unwrap_or(now).to_string());
    payload.join(" ")
}

/// Render a batch of rows sharing one measurement
pub fn render_lines(measurement: &str, rows: &[WriteRow], now: i64) -> Vec<String> {
    rows.iter()
        .map(|row| render_line(measurement, row, now))
        .collect()
}

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

fn escape_string_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
