//! Abstract relational query
//!
//! Describes what a caller wants from a table without committing to a
//! statement kind; the renderer turns it into SELECT/COUNT/INSERT/UPDATE/
//! DELETE text.

use super::column::render_column;
use serde::{Deserialize, Serialize};

/// An abstract query over one table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbstractQuery {
    /// Table name
    pub table: String,
    /// Optional table alias
    #[serde(default)]
    pub alias: Option<String>,
    /// Column expressions (`col`, `table.col as key`, `UNCOMPRESS(...)`, ...)
    #[serde(default)]
    pub columns: Vec<String>,
    /// Pre-rendered boolean fragment appended after `WHERE 1`
    #[serde(default)]
    pub where_clause: String,
    /// Pre-rendered join fragments
    #[serde(default)]
    pub joins: Vec<String>,
    /// Joined sub-queries
    #[serde(default)]
    pub joined: Vec<JoinedQuery>,
    /// ORDER BY fragment
    #[serde(default)]
    pub order_by: Option<String>,
    /// Zero-based page index
    #[serde(default)]
    pub page: Option<u64>,
    /// Page size, or a flat limit when no page is set
    #[serde(default)]
    pub limit: Option<u64>,
    /// Serialized `(column, literal)` pairs for INSERT/UPDATE
    #[serde(default)]
    pub data: Vec<(String, String)>,
}

impl AbstractQuery {
    /// Create a query over a table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Builder method: set the alias
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Builder method: add a column expression
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Builder method: add several column expressions
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Builder method: set the where fragment (e.g. `AND id = 3`)
    pub fn where_clause(mut self, fragment: impl Into<String>) -> Self {
        self.where_clause = fragment.into();
        self
    }

    /// Builder method: add a raw join fragment
    pub fn join(mut self, fragment: impl Into<String>) -> Self {
        self.joins.push(fragment.into());
        self
    }

    /// Builder method: join a sub-query
    pub fn join_query(mut self, query: AbstractQuery, spec: JoinSpec) -> Self {
        self.joined.push(JoinedQuery { query, spec });
        self
    }

    /// Builder method: set the ORDER BY fragment
    pub fn order_by(mut self, order: impl Into<String>) -> Self {
        self.order_by = Some(order.into());
        self
    }

    /// Builder method: paginate with a zero-based page index and page size
    pub fn page(mut self, page: u64, size: u64) -> Self {
        self.page = Some(page);
        self.limit = Some(size);
        self
    }

    /// Builder method: set a flat limit
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Builder method: set a column assignment for INSERT/UPDATE
    pub fn set(mut self, column: impl Into<String>, literal: impl Into<String>) -> Self {
        self.data.push((column.into(), literal.into()));
        self
    }

    /// Builder method: replace all column assignments
    pub fn data(mut self, data: Vec<(String, String)>) -> Self {
        self.data = data;
        self
    }

    /// Name columns are qualified with: the alias if set, else the table
    pub fn table_or_alias(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.table,
        }
    }

    /// `<table>[ AS <alias>]`
    pub fn table_reference(&self) -> String {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => format!("{} AS {}", self.table, alias),
            _ => self.table.clone(),
        }
    }

    /// Render the clause joining this query onto `parent`
    pub fn join_string(&self, spec: &JoinSpec, parent: &str) -> String {
        let left = render_column(&spec.left, parent);
        let right = render_column(&spec.right, self.table_or_alias());
        let mut r = format!(
            "{} JOIN {} ON {}={}",
            spec.kind,
            self.table_reference(),
            left,
            right
        );
        let fragment = self.where_clause.trim();
        if !fragment.is_empty() {
            r.push(' ');
            r.push_str(fragment);
        }
        r
    }
}

/// A sub-query joined into a parent query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinedQuery {
    /// The joined query (its columns and where fragment are merged in)
    pub query: AbstractQuery,
    /// How it is joined
    pub spec: JoinSpec,
}

/// Join metadata: kind plus the parent-side and joined-side columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSpec {
    /// Join kind
    #[serde(default)]
    pub kind: JoinKind,
    /// Column on the parent table
    pub left: String,
    /// Column on the joined table
    pub right: String,
}

impl JoinSpec {
    /// LEFT JOIN on `left = right`
    pub fn left(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            kind: JoinKind::Left,
            left: left.into(),
            right: right.into(),
        }
    }

    /// INNER JOIN on `left = right`
    pub fn inner(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            kind: JoinKind::Inner,
            left: left.into(),
            right: right.into(),
        }
    }
}

/// SQL join kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    /// LEFT JOIN
    #[default]
    Left,
    /// INNER JOIN
    Inner,
    /// RIGHT JOIN
    Right,
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "LEFT"),
            Self::Inner => write!(f, "INNER"),
            Self::Right => write!(f, "RIGHT"),
        }
    }
}
