//! Schema boundary
//!
//! Field descriptors, the schema provider trait and the values that flow
//! through the typed serializer:
//!
//! - **types**: `FieldKind`, `FieldDescriptor`, `SchemaProvider`, `Schema`
//! - **value**: `Value`, `FileRef`, `Row`

pub mod types;
pub mod value;

pub use types::{FieldDescriptor, FieldKind, Schema, SchemaProvider};
pub use value::{FileRef, Row, Value};
