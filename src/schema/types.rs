//! Schema field descriptors
//!
//! The schema layer is owned by the caller: the core only reads table names
//! and field descriptors through the [`SchemaProvider`] trait.

use serde::{Deserialize, Serialize};

/// Declared kind of a schema field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Plain text column
    String,
    /// Email address (text column)
    Email,
    /// HTML fragment (escaped text column)
    Html,
    /// Boolean stored as 1/0
    Boolean,
    /// Integer column
    Integer,
    /// Floating point column
    Float,
    /// Epoch seconds column
    UnixTimestamp,
    /// `YYYY-MM-DD HH:MM:SS` column
    DateTime,
    /// File reference stored by name
    File,
    /// Foreign key column, addressed as `<key>Id` in write maps
    ForeignKey,
    /// Comma separated list of related keys
    RelatedKeys,
    /// JSON document, optionally compressed
    Json,
    /// Pivot relation (no backing column)
    Pivot,
    /// Related entity (no backing column)
    Related,
    /// Computed value (no backing column)
    Computed,
}

impl FieldKind {
    /// Whether values of this kind are persisted in a column of their own
    pub fn has_column(&self) -> bool {
        !matches!(self, Self::Pivot | Self::Related | Self::Computed)
    }

    /// Whether this kind contributes a column to read extraction
    pub fn is_readable(&self) -> bool {
        !matches!(
            self,
            Self::Pivot | Self::Related | Self::RelatedKeys | Self::Computed
        )
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Email => "email",
            Self::Html => "html",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::UnixTimestamp => "unix_timestamp",
            Self::DateTime => "datetime",
            Self::File => "file",
            Self::ForeignKey => "foreign_key",
            Self::RelatedKeys => "related_keys",
            Self::Json => "json",
            Self::Pivot => "pivot",
            Self::Related => "related",
            Self::Computed => "computed",
        };
        write!(f, "{}", name)
    }
}

/// A single schema field: logical key, backend column and declared kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Logical key used by callers
    pub key: String,
    /// Backend column name
    pub column: String,
    /// Declared kind
    pub kind: FieldKind,
    /// Compression flag (only meaningful for JSON fields)
    #[serde(default)]
    pub compressed: bool,
}

impl FieldDescriptor {
    /// Create a new descriptor
    pub fn new(key: impl Into<String>, column: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            column: column.into(),
            kind,
            compressed: false,
        }
    }

    /// Builder method: mark the field as compressed
    pub fn compressed(mut self) -> Self {
        self.compressed = true;
        self
    }

    /// Whether the value renders wrapped in COMPRESS()/UNCOMPRESS()
    pub fn is_compressed_json(&self) -> bool {
        self.kind == FieldKind::Json && self.compressed
    }

    /// Key under which the field is looked up in write maps
    pub fn write_key(&self) -> String {
        match self.kind {
            FieldKind::ForeignKey => format!("{}Id", self.key),
            _ => self.key.clone(),
        }
    }
}

/// Read-only view over a resolved schema
pub trait SchemaProvider {
    /// Backing table name
    fn table(&self) -> &str;

    /// All declared fields, in declaration order
    fn all_fields(&self) -> Vec<&FieldDescriptor>;

    /// Fields stored directly in the backing table
    fn same_table_fields(&self) -> Vec<&FieldDescriptor> {
        self.all_fields()
            .into_iter()
            .filter(|field| field.kind.has_column())
            .collect()
    }
}

/// In-memory schema definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    /// Backing table name
    pub table: String,
    /// Declared fields
    pub fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Create an empty schema for a table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            fields: Vec::new(),
        }
    }

    /// Builder method: add a field
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by logical key
    pub fn get(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }
}

impl SchemaProvider for Schema {
    fn table(&self) -> &str {
        &self.table
    }

    fn all_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields.iter().collect()
    }
}
