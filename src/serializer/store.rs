//! Write-map preparation
//!
//! Turns a caller's logical write map into `(column, literal)` assignments
//! ready for the INSERT/UPDATE renderer.

use super::field::serialize_field;
use crate::schema::{SchemaProvider, Value};
use std::collections::HashMap;

/// Serialize a logical write map into column assignments, in schema order
///
/// Fields without a backing column are skipped, foreign keys are read from
/// `<key>Id` and keys missing from `data` are left out.
pub fn prepare_data_to_store<S: SchemaProvider + ?Sized>(
    schema: &S,
    data: &HashMap<String, Value>,
) -> Vec<(String, String)> {
    schema
        .all_fields()
        .into_iter()
        .filter(|field| field.kind.has_column())
        .filter_map(|field| {
            let value = data.get(&field.write_key())?;
            Some((field.column.trim().to_string(), serialize_field(field, value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, FieldKind, Schema};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new("articles")
            .field(FieldDescriptor::new("title", "title", FieldKind::String))
            .field(FieldDescriptor::new("author", "author_id", FieldKind::ForeignKey))
            .field(FieldDescriptor::new("published", "is_published", FieldKind::Boolean))
            .field(FieldDescriptor::new("meta", "meta", FieldKind::Json).compressed())
            .field(FieldDescriptor::new("comments", "", FieldKind::Related))
    }

    #[test]
    fn test_prepare_maps_to_columns() {
        let mut data = HashMap::new();
        data.insert("title".to_string(), Value::from(" Hello "));
        data.insert("authorId".to_string(), Value::Int(7));
        data.insert("published".to_string(), Value::Bool(true));
        data.insert("comments".to_string(), Value::from("ignored"));

        let prepared = prepare_data_to_store(&schema(), &data);
        assert_eq!(
            prepared,
            vec![
                ("title".to_string(), "Hello".to_string()),
                ("author_id".to_string(), "7".to_string()),
                ("is_published".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_foreign_key_requires_id_suffix() {
        let mut data = HashMap::new();
        data.insert("author".to_string(), Value::Int(7));
        assert!(prepare_data_to_store(&schema(), &data).is_empty());
    }

    #[test]
    fn test_compressed_json_is_wrapped() {
        let mut data = HashMap::new();
        data.insert("meta".to_string(), Value::Json(json!({"k": 1})));

        let prepared = prepare_data_to_store(&schema(), &data);
        assert_eq!(prepared.len(), 1);
        assert_eq!(prepared[0].0, "meta");
        assert!(prepared[0].1.starts_with("COMPRESS('"));
    }
}
