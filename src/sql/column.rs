//! Column expression rendering
//!
//! Every column expression is split into a key and an optional alias on the
//! first case-insensitive ` as `, then classified. Classification order is
//! significant:
//!
//! 1. pre-formed expressions (`UNCOMPRESS...`, quoted literals, `DISTINCT ...`,
//!    anything with a `(` past the first character) are emitted untouched
//! 2. keys already starting with `<table>.` are emitted untouched
//! 3. everything else is prefixed with `<table>.`
//!
//! Checking expressions first keeps `UNCOMPRESS(orders.body)` from being
//! prefixed a second time.

use super::query::AbstractQuery;
use crate::schema::{FieldKind, SchemaProvider};
use crate::serializer::UNCOMPRESS_PREFIX;

/// How a column key is treated by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnClass {
    /// Function call, literal or DISTINCT expression
    Expression,
    /// Already qualified with the target table
    Qualified,
    /// Needs the table prefix
    Bare,
}

const ALIAS_SEPARATOR: &str = " as ";

/// Split `key as alias` on the first case-insensitive ` as `
pub fn split_alias(column: &str) -> (&str, Option<&str>) {
    // ASCII lowercasing keeps byte offsets aligned with the original
    match column.to_ascii_lowercase().find(ALIAS_SEPARATOR) {
        Some(pos) => {
            let key = column[..pos].trim();
            let alias = column[pos + ALIAS_SEPARATOR.len()..].trim();
            (key, Some(alias).filter(|a| !a.is_empty()))
        }
        None => (column.trim(), None),
    }
}

/// Classify a column key against the table it would be qualified with
pub fn classify_column(key: &str, table: &str) -> ColumnClass {
    let is_expression = key.starts_with(UNCOMPRESS_PREFIX)
        || key.starts_with('\'')
        || key.starts_with('"')
        || key.starts_with("DISTINCT")
        || key.find('(').map(|pos| pos > 0).unwrap_or(false);

    if is_expression {
        ColumnClass::Expression
    } else if table.is_empty() || key.starts_with(&format!("{}.", table)) {
        ColumnClass::Qualified
    } else {
        ColumnClass::Bare
    }
}

/// Render one column expression for a table (or alias)
pub fn render_column(column: &str, table: &str) -> String {
    let (key, alias) = split_alias(column);

    let rendered = match classify_column(key, table) {
        ColumnClass::Expression | ColumnClass::Qualified => key.to_string(),
        ColumnClass::Bare => format!("{}.{}", table, key),
    };

    match alias {
        Some(alias) => format!("{} AS {}", rendered, alias),
        None => rendered,
    }
}

/// Render the column list of a query, joined sub-query columns included
///
/// An empty list renders as `*`.
pub fn render_columns(query: &AbstractQuery) -> String {
    let own = query
        .columns
        .iter()
        .map(|column| render_column(column, query.table_or_alias()));

    let joined = query.joined.iter().flat_map(|joined| {
        let table = joined.query.table_or_alias().to_string();
        joined
            .query
            .columns
            .iter()
            .map(move |column| render_column(column, &table))
    });

    let rendered: Vec<String> = own.chain(joined).collect();
    if rendered.is_empty() {
        "*".to_string()
    } else {
        rendered.join(",")
    }
}

/// Read columns for every direct-column field of a schema
///
/// Compressed JSON fields are read through `UNCOMPRESS()`.
pub fn extract_schema_columns<S: SchemaProvider + ?Sized>(schema: &S) -> Vec<String> {
    let table = schema.table();

    schema
        .same_table_fields()
        .into_iter()
        .filter(|field| field.kind.is_readable())
        .map(|field| {
            let column = field.column.trim();
            if field.kind == FieldKind::Json && field.compressed {
                format!("{}({}.{}) as {}", UNCOMPRESS_PREFIX, table, column, field.key)
            } else {
                format!("{}.{} as {}", table, column, field.key)
            }
        })
        .collect()
}
