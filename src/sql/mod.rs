//! Relational Query Renderer
//!
//! Renders abstract queries into SQL text:
//!
//! - **query**: `AbstractQuery` and joined sub-queries
//! - **column**: column classification and table qualification
//! - **render**: statement assembly per mode and SET assignments
//!
//! # Example
//!
//! ```rust
//! use dualquery::sql::{render, AbstractQuery, RenderMode};
//!
//! let query = AbstractQuery::new("orders")
//!     .columns(["id", "total as amount"])
//!     .where_clause("AND status = 'paid'")
//!     .page(2, 10);
//!
//! assert_eq!(
//!     render(&query, RenderMode::Select, None),
//!     "SELECT orders.id,orders.total AS amount FROM orders WHERE 1 AND status = 'paid' LIMIT 20, 10"
//! );
//! ```

mod column;
mod query;
mod render;

pub use column::{
    classify_column, extract_schema_columns, render_column, render_columns, split_alias,
    ColumnClass,
};
pub use query::{AbstractQuery, JoinKind, JoinSpec, JoinedQuery};
pub use render::{limit_clause, render, render_assignments, render_mode, RenderMode};
