//! Typed Field Serializer
//!
//! Converts a single value into a backend-safe literal based on the declared
//! field kind. Serialization never fails: values of the wrong shape degrade
//! to the documented sentinel for their kind.
//!
//! | Kind | Output |
//! |------|--------|
//! | String, Email, RelatedKeys, ForeignKey | trimmed text |
//! | Html | database-escaped text |
//! | Boolean | `1` / `0` |
//! | Integer / Float | parsed number, `0` / `0.0` on failure |
//! | UnixTimestamp | epoch seconds, `0` on failure |
//! | DateTime | `YYYY-MM-DD HH:MM:SS`, `0000-00-00 00:00:00` on failure |
//! | File | file name, empty on failure |
//! | Json | escaped JSON text for objects/arrays, pass-through otherwise |
//! | Pivot, Related, Computed | pass-through, unescaped |
//!
//! Text, HTML and JSON literals are wrapped in `COMPRESS('...')` when the
//! compressed flag is set.

use super::escape::{db_escape, html_escape};
use crate::schema::{FieldDescriptor, FieldKind, Value};

/// Sentinel emitted for date/time fields without a structured value
pub const ZERO_DATETIME: &str = "0000-00-00 00:00:00";

/// Prefix of a write-time compression expression
pub const COMPRESS_PREFIX: &str = "COMPRESS(";

/// Prefix of a read-time decompression expression
pub const UNCOMPRESS_PREFIX: &str = "UNCOMPRESS";

/// Serialize a value according to a field kind
pub fn serialize(value: &Value, kind: FieldKind, compressed: bool) -> String {
    match kind {
        FieldKind::String | FieldKind::Email | FieldKind::RelatedKeys | FieldKind::ForeignKey => {
            let text = value.to_text();
            let text = text.trim();
            if compressed {
                compress(&db_escape(text))
            } else {
                text.to_string()
            }
        }
        FieldKind::Html => {
            let escaped = db_escape(&value.to_text());
            if compressed {
                compress(&escaped)
            } else {
                escaped
            }
        }
        FieldKind::Boolean => {
            if value.is_truthy() {
                "1".to_string()
            } else {
                "0".to_string()
            }
        }
        FieldKind::Integer => value.as_i64().unwrap_or(0).to_string(),
        FieldKind::Float => format_float(value.as_f64().unwrap_or(0.0)),
        FieldKind::UnixTimestamp => match value {
            Value::DateTime(dt) => dt.and_utc().timestamp().to_string(),
            _ => "0".to_string(),
        },
        FieldKind::DateTime => match value {
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            _ => ZERO_DATETIME.to_string(),
        },
        FieldKind::File => match value {
            Value::File(file) => file.name.clone(),
            _ => String::new(),
        },
        FieldKind::Json => match value.as_structured_json() {
            Some(json) => {
                let escaped = db_escape(&html_escape(&json.to_string()));
                if compressed {
                    compress(&escaped)
                } else {
                    escaped
                }
            }
            None => value.to_text(),
        },
        // No backing column: callers must validate these themselves
        FieldKind::Pivot | FieldKind::Related | FieldKind::Computed => value.to_text(),
    }
}

/// Serialize a value for a schema field
pub fn serialize_field(field: &FieldDescriptor, value: &Value) -> String {
    serialize(value, field.kind, field.compressed)
}

/// Whether a literal is already a formed compression expression
pub fn is_compress_expr(literal: &str) -> bool {
    literal.starts_with(COMPRESS_PREFIX)
}

fn compress(escaped: &str) -> String {
    format!("{}'{}')", COMPRESS_PREFIX, escaped)
}

/// Floats always carry a decimal point so they read back as floats
fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FileRef;
    use chrono::NaiveDate;
    use serde_json::json;

    fn datetime() -> Value {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .and_then(|d| d.and_hms_opt(14, 35, 42))
            .map(Value::DateTime)
            .unwrap()
    }

    #[test]
    fn test_string_kinds_trim() {
        let v = Value::from("  hello  ");
        assert_eq!(serialize(&v, FieldKind::String, false), "hello");
        assert_eq!(serialize(&v, FieldKind::Email, false), "hello");
        assert_eq!(serialize(&v, FieldKind::ForeignKey, false), "hello");
        assert_eq!(serialize(&v, FieldKind::RelatedKeys, false), "hello");
    }

    #[test]
    fn test_compressed_string() {
        let v = Value::from(" it's ");
        assert_eq!(
            serialize(&v, FieldKind::String, true),
            "COMPRESS('it\\'s')"
        );
    }

    #[test]
    fn test_html_is_escaped() {
        let v = Value::from("<p>O'Neil</p>");
        assert_eq!(serialize(&v, FieldKind::Html, false), "<p>O\\'Neil</p>");
        assert_eq!(
            serialize(&v, FieldKind::Html, true),
            "COMPRESS('<p>O\\'Neil</p>')"
        );
    }

    #[test]
    fn test_boolean() {
        assert_eq!(serialize(&Value::Bool(true), FieldKind::Boolean, false), "1");
        assert_eq!(serialize(&Value::from("0"), FieldKind::Boolean, false), "0");
        assert_eq!(serialize(&Value::Null, FieldKind::Boolean, false), "0");
    }

    #[test]
    fn test_numbers_degrade_to_zero() {
        assert_eq!(serialize(&Value::from("12"), FieldKind::Integer, false), "12");
        assert_eq!(serialize(&Value::from("nope"), FieldKind::Integer, false), "0");
        assert_eq!(serialize(&Value::from("1.25"), FieldKind::Float, false), "1.25");
        assert_eq!(serialize(&Value::from("nope"), FieldKind::Float, false), "0.0");
        assert_eq!(serialize(&Value::Int(3), FieldKind::Float, false), "3.0");
    }

    #[test]
    fn test_timestamps() {
        assert_eq!(
            serialize(&datetime(), FieldKind::UnixTimestamp, false),
            "1705329342"
        );
        assert_eq!(
            serialize(&Value::from("yesterday"), FieldKind::UnixTimestamp, false),
            "0"
        );
        assert_eq!(
            serialize(&datetime(), FieldKind::DateTime, false),
            "2024-01-15 14:35:42"
        );
        assert_eq!(
            serialize(&Value::from("2024-01-15"), FieldKind::DateTime, false),
            ZERO_DATETIME
        );
    }

    #[test]
    fn test_file() {
        let file = Value::File(FileRef::new("avatar.png"));
        assert_eq!(serialize(&file, FieldKind::File, false), "avatar.png");
        assert_eq!(serialize(&Value::from("avatar.png"), FieldKind::File, false), "");
    }

    #[test]
    fn test_json_structured() {
        let v = Value::Json(json!({"name": "O'Neil"}));
        assert_eq!(
            serialize(&v, FieldKind::Json, false),
            "{&quot;name&quot;:&quot;O&#039;Neil&quot;}"
        );
        assert!(serialize(&v, FieldKind::Json, true).starts_with("COMPRESS('{&quot;"));
    }

    #[test]
    fn test_json_passthrough() {
        let v = Value::from("{\"raw\":true}");
        assert_eq!(serialize(&v, FieldKind::Json, false), "{\"raw\":true}");
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let v = Value::Json(json!({"b": [1, 2], "a": "x"}));
        for kind in [FieldKind::Json, FieldKind::String, FieldKind::Html, FieldKind::Float] {
            assert_eq!(serialize(&v, kind, false), serialize(&v, kind, false));
        }
    }

    #[test]
    fn test_computed_passthrough() {
        let v = Value::from("1; DROP TABLE x");
        assert_eq!(serialize(&v, FieldKind::Computed, false), "1; DROP TABLE x");
    }
}
