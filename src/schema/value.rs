//! Field values handed to the serializer
//!
//! Callers pass either scalar values or structured ones (date/time, file
//! references, JSON documents). The serializer decides per field kind which
//! shapes it accepts and degrades everything else to a sentinel.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A result row: column name → JSON value
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Reference to a stored file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRef {
    /// Stored file name
    pub name: String,
    /// Optional location on disk or in an object store
    #[serde(default)]
    pub path: Option<String>,
}

impl FileRef {
    /// Create a file reference by name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
        }
    }
}

/// A single value for a typed field
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Raw text
    Text(String),
    /// Structured date/time
    DateTime(NaiveDateTime),
    /// Structured file reference
    File(FileRef),
    /// Structured JSON document
    Json(serde_json::Value),
}

impl Value {
    /// Text representation used by pass-through kinds
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(true) => "1".to_string(),
            Self::Bool(false) => "0".to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::File(file) => file.name.clone(),
            Self::Json(serde_json::Value::String(s)) => s.clone(),
            Self::Json(json) => json.to_string(),
        }
    }

    /// Loose truthiness: empty, zero, `"0"` and `"false"` are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Text(s) => {
                let s = s.trim();
                !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
            }
            Self::DateTime(_) | Self::File(_) => true,
            Self::Json(json) => match json {
                serde_json::Value::Null => false,
                serde_json::Value::Bool(b) => *b,
                serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
                serde_json::Value::String(s) => Value::Text(s.clone()).is_truthy(),
                serde_json::Value::Array(a) => !a.is_empty(),
                serde_json::Value::Object(o) => !o.is_empty(),
            },
        }
    }

    /// Numeric coercion to an integer; non-numeric input yields `None`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            }
            Self::Json(serde_json::Value::Number(n)) => {
                n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            }
            Self::Json(serde_json::Value::String(s)) => Value::Text(s.clone()).as_i64(),
            _ => None,
        }
    }

    /// Numeric coercion to a float; non-numeric input yields `None`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) if f.is_finite() => Some(*f),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            Self::Json(serde_json::Value::Number(n)) => n.as_f64(),
            Self::Json(serde_json::Value::String(s)) => Value::Text(s.clone()).as_f64(),
            _ => None,
        }
    }

    /// Structured JSON document (objects and arrays only)
    pub fn as_structured_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(json @ (serde_json::Value::Object(_) | serde_json::Value::Array(_))) => {
                Some(json)
            }
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt.naive_utc())
    }
}

impl From<FileRef> for Value {
    fn from(file: FileRef) -> Self {
        Self::File(file)
    }
}

impl From<serde_json::Value> for Value {
    /// Scalars map onto their native variants; objects and arrays stay JSON
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(0.0)),
            },
            serde_json::Value::String(s) => Self::Text(s),
            structured => Self::Json(structured),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(Value::from("yes").is_truthy());
        assert!(Value::Int(1).is_truthy());
        assert!(!Value::from("0").is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::from("false").is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Json(json!([])).is_truthy());
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::from(" 42 ").as_i64(), Some(42));
        assert_eq!(Value::from("4.9").as_i64(), Some(4));
        assert_eq!(Value::from("abc").as_i64(), None);
        assert_eq!(Value::from("2.5").as_f64(), Some(2.5));
        assert_eq!(Value::Float(f64::NAN).as_f64(), None);
    }

    #[test]
    fn test_from_json_keeps_structures() {
        assert_eq!(Value::from(json!(3)), Value::Int(3));
        assert_eq!(Value::from(json!("x")), Value::Text("x".into()));
        assert!(Value::from(json!({"a": 1})).as_structured_json().is_some());
        assert!(Value::from(json!("{}")).as_structured_json().is_none());
    }
}
