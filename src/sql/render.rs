//! Statement assembly
//!
//! Renders an [`AbstractQuery`] into one SQL statement per mode. Rendering is
//! a pure function of the query: identical queries produce byte-identical
//! text, which the result cache relies on for its keys.
//!
//! ```text
//! SELECT <columns> FROM <table>[ AS <alias>] <joins> WHERE 1 <where>[ ORDER BY ..][ LIMIT ..]
//! SELECT COUNT([DISTINCT ]<field>) AS Count FROM ... WHERE 1 <where>
//! INSERT INTO <table> SET `col`='v',...
//! UPDATE <table> SET `col`='v',... WHERE 1 <where>
//! DELETE FROM <table> WHERE 1 <where>
//! ```

use super::column::render_columns;
use super::query::AbstractQuery;
use crate::serializer::{is_compress_expr, reescape};

/// Statement kinds the renderer produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// SELECT
    Select,
    /// SELECT DISTINCT
    SelectDistinct,
    /// SELECT COUNT(field)
    Count,
    /// SELECT COUNT(DISTINCT field)
    CountDistinct,
    /// INSERT ... SET
    Insert,
    /// UPDATE ... SET ... WHERE
    Update,
    /// DELETE ... WHERE
    Delete,
}

impl RenderMode {
    /// Parse a mode name; unknown names yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "").as_str() {
            "select" => Some(Self::Select),
            "selectdistinct" => Some(Self::SelectDistinct),
            "count" => Some(Self::Count),
            "countdistinct" => Some(Self::CountDistinct),
            "insert" | "create" => Some(Self::Insert),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Whether statements of this mode only read
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            Self::Select | Self::SelectDistinct | Self::Count | Self::CountDistinct
        )
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Select => write!(f, "select"),
            Self::SelectDistinct => write!(f, "selectDistinct"),
            Self::Count => write!(f, "count"),
            Self::CountDistinct => write!(f, "countDistinct"),
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Render a query by mode name
///
/// Unsupported mode names render as an empty string, meaning "nothing to
/// execute".
pub fn render_mode(query: &AbstractQuery, mode: &str, countable: Option<&str>) -> String {
    match RenderMode::parse(mode) {
        Some(mode) => render(query, mode, countable),
        None => String::new(),
    }
}

/// Render a query as a statement of the given mode
///
/// INSERT and UPDATE without assignments render as an empty string.
pub fn render(query: &AbstractQuery, mode: RenderMode, countable: Option<&str>) -> String {
    match mode {
        RenderMode::Select => {
            let mut r = format!("SELECT {} {}", render_columns(query), from_clause(query));
            push_order_and_limit(&mut r, query);
            r
        }
        RenderMode::SelectDistinct => {
            let columns =
                format!("DISTINCT {}", render_columns(query)).replacen("DISTINCT DISTINCT", "DISTINCT", 1);
            let mut r = format!("SELECT {} {}", columns, from_clause(query));
            push_order_and_limit(&mut r, query);
            r
        }
        RenderMode::Count | RenderMode::CountDistinct => {
            let counted = match countable.map(str::trim).filter(|c| !c.is_empty()) {
                Some(field) if mode == RenderMode::CountDistinct => format!("DISTINCT {}", field),
                Some(field) => field.to_string(),
                None => "*".to_string(),
            };
            format!("SELECT COUNT({}) AS Count {}", counted, from_clause(query))
        }
        RenderMode::Insert => {
            if query.data.is_empty() {
                return String::new();
            }
            format!(
                "INSERT INTO {} SET {}",
                query.table,
                render_assignments(&query.data)
            )
        }
        RenderMode::Update => {
            if query.data.is_empty() {
                return String::new();
            }
            format!(
                "UPDATE {} SET {} {}",
                query.table,
                render_assignments(&query.data),
                where_clause(query)
            )
        }
        RenderMode::Delete => format!("DELETE FROM {} {}", query.table, where_clause(query)),
    }
}

/// Render `field=value` assignments for INSERT/UPDATE
///
/// `COMPRESS(...)` values are emitted verbatim; everything else is quoted
/// with its backslash escaping normalized to a single level, so passing an
/// already-escaped value through again does not escape it twice.
pub fn render_assignments(data: &[(String, String)]) -> String {
    data.iter()
        .map(|(field, value)| {
            if is_compress_expr(value) {
                format!("`{}`={}", field, value)
            } else {
                format!("`{}`='{}'", field, reescape(value))
            }
        })
        .collect::<Vec<_>>()
        .join(",")
        .trim()
        .to_string()
}

/// `LIMIT` clause for the query's pagination, if any
///
/// The offset saturates at `u64::MAX`.
pub fn limit_clause(query: &AbstractQuery) -> Option<String> {
    match (query.page, query.limit) {
        (Some(page), Some(size)) => Some(format!(
            "LIMIT {}, {}",
            page.saturating_mul(size),
            size
        )),
        (None, Some(size)) => Some(format!("LIMIT {}", size)),
        _ => None,
    }
}

fn from_clause(query: &AbstractQuery) -> String {
    let mut parts = vec![format!("FROM {}", query.table_reference())];

    parts.extend(
        query
            .joins
            .iter()
            .map(|join| join.trim().to_string())
            .filter(|join| !join.is_empty()),
    );

    let parent = query.table_or_alias();
    parts.extend(
        query
            .joined
            .iter()
            .map(|joined| joined.query.join_string(&joined.spec, parent)),
    );

    parts.push(where_clause(query));
    parts.join(" ")
}

fn where_clause(query: &AbstractQuery) -> String {
    let fragment = query.where_clause.trim();
    if fragment.is_empty() {
        "WHERE 1".to_string()
    } else {
        format!("WHERE 1 {}", fragment)
    }
}

fn push_order_and_limit(r: &mut String, query: &AbstractQuery) {
    if let Some(order) = query.order_by.as_deref().map(str::trim).filter(|o| !o.is_empty()) {
        r.push_str(" ORDER BY ");
        r.push_str(order);
    }
    if let Some(limit) = limit_clause(query) {
        r.push(' ');
        r.push_str(&limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldKind, Value};
    use crate::serializer::serialize;
    use crate::sql::query::JoinSpec;

    fn orders() -> AbstractQuery {
        AbstractQuery::new("orders")
            .columns(["id", "orders.total", "UNCOMPRESS(orders.notes) as notes"])
            .where_clause("AND orders.status = 'paid'")
    }

    #[test]
    fn test_select() {
        assert_eq!(
            render(&orders(), RenderMode::Select, None),
            "SELECT orders.id,orders.total,UNCOMPRESS(orders.notes) AS notes FROM orders WHERE 1 AND orders.status = 'paid'"
        );
    }

    #[test]
    fn test_select_with_alias_joins_order_and_page() {
        let users = AbstractQuery::new("users").alias("u").column("name as customer");
        let query = AbstractQuery::new("orders")
            .alias("o")
            .column("id")
            .join("LEFT JOIN shops s ON s.id=o.shop_id")
            .join_query(users, JoinSpec::left("user_id", "id"))
            .order_by("o.id DESC")
            .page(2, 10);

        assert_eq!(
            render(&query, RenderMode::Select, None),
            "SELECT o.id,u.name AS customer FROM orders AS o LEFT JOIN shops s ON s.id=o.shop_id LEFT JOIN users AS u ON o.user_id=u.id WHERE 1 ORDER BY o.id DESC LIMIT 20, 10"
        );
    }

    #[test]
    fn test_pagination() {
        let base = AbstractQuery::new("t").column("id");

        let paged = base.clone().page(2, 10);
        assert_eq!(limit_clause(&paged).as_deref(), Some("LIMIT 20, 10"));

        let limited = base.clone().limit(5);
        assert_eq!(limit_clause(&limited).as_deref(), Some("LIMIT 5"));

        assert_eq!(limit_clause(&base), None);
        assert!(!render(&base, RenderMode::Select, None).contains("LIMIT"));
    }

    #[test]
    fn test_huge_page_saturates_offset() {
        let query = AbstractQuery::new("t").page(u64::MAX / 2, 10);
        let expected = format!("LIMIT {}, 10", u64::MAX);
        assert_eq!(limit_clause(&query), Some(expected.clone()));
        assert!(render(&query, RenderMode::Select, None).ends_with(&expected));
    }

    #[test]
    fn test_select_distinct_collapses_double_marker() {
        let query = AbstractQuery::new("orders").column("DISTINCT user_id");
        assert_eq!(
            render(&query, RenderMode::SelectDistinct, None),
            "SELECT DISTINCT user_id FROM orders WHERE 1"
        );

        let query = AbstractQuery::new("orders").column("user_id");
        assert_eq!(
            render(&query, RenderMode::SelectDistinct, None),
            "SELECT DISTINCT orders.user_id FROM orders WHERE 1"
        );
    }

    #[test]
    fn test_count_ignores_order_and_pagination() {
        let query = orders().order_by("id").page(1, 10);
        assert_eq!(
            render(&query, RenderMode::CountDistinct, Some("orders.id")),
            "SELECT COUNT(DISTINCT orders.id) AS Count FROM orders WHERE 1 AND orders.status = 'paid'"
        );
        assert_eq!(
            render(&query, RenderMode::Count, Some("orders.id")),
            "SELECT COUNT(orders.id) AS Count FROM orders WHERE 1 AND orders.status = 'paid'"
        );
        assert_eq!(
            render(&query, RenderMode::Count, None),
            "SELECT COUNT(*) AS Count FROM orders WHERE 1 AND orders.status = 'paid'"
        );
    }

    #[test]
    fn test_insert_update_delete() {
        let query = AbstractQuery::new("orders")
            .where_clause("AND id = 4")
            .set("total", "12.5")
            .set("notes", "COMPRESS('hello')");

        assert_eq!(
            render(&query, RenderMode::Insert, None),
            "INSERT INTO orders SET `total`='12.5',`notes`=COMPRESS('hello')"
        );
        assert_eq!(
            render(&query, RenderMode::Update, None),
            "UPDATE orders SET `total`='12.5',`notes`=COMPRESS('hello') WHERE 1 AND id = 4"
        );
        assert_eq!(
            render(&query, RenderMode::Delete, None),
            "DELETE FROM orders WHERE 1 AND id = 4"
        );
    }

    #[test]
    fn test_write_without_data_renders_nothing() {
        let query = AbstractQuery::new("orders");
        assert_eq!(render(&query, RenderMode::Insert, None), "");
        assert_eq!(render(&query, RenderMode::Update, None), "");
    }

    #[test]
    fn test_unknown_mode_renders_empty() {
        assert_eq!(render_mode(&orders(), "truncate", None), "");
        assert_eq!(
            render_mode(&orders(), "select", None),
            render(&orders(), RenderMode::Select, None)
        );
        assert_eq!(RenderMode::parse("select_distinct"), Some(RenderMode::SelectDistinct));
        assert_eq!(RenderMode::parse("create"), Some(RenderMode::Insert));
    }

    #[test]
    fn test_assignments_escape_once() {
        let data = vec![("name".to_string(), "O'Reilly".to_string())];
        let once = render_assignments(&data);
        assert_eq!(once, "`name`='O\\'Reilly'");

        let escaped = vec![("name".to_string(), "O\\'Reilly".to_string())];
        assert_eq!(render_assignments(&escaped), once);
    }

    #[test]
    fn test_serialized_html_keeps_line_breaks() {
        let body = serialize(&Value::from("<p>a</p>\n<p>b</p>\r\n"), FieldKind::Html, false);
        let data = vec![("body".to_string(), body)];
        assert_eq!(
            render_assignments(&data),
            "`body`='<p>a</p>\\n<p>b</p>\\r\\n'"
        );
    }

    #[test]
    fn test_serialized_json_keeps_backslashes() {
        let value = Value::Json(serde_json::json!({"path": "a\\b"}));
        let data = vec![("meta".to_string(), serialize(&value, FieldKind::Json, false))];
        assert_eq!(
            render_assignments(&data),
            r#"`meta`='{&quot;path&quot;:&quot;a\\\\b&quot;}'"#
        );
    }

    #[test]
    fn test_compressed_values_pass_through_twice() {
        let data = vec![("body".to_string(), "COMPRESS('it\\'s')".to_string())];
        let first = render_assignments(&data);
        assert_eq!(first, "`body`=COMPRESS('it\\'s')");
        assert_eq!(render_assignments(&data), first);
    }

    #[test]
    fn test_render_is_stable() {
        let query = orders().page(3, 7);
        for mode in [RenderMode::Select, RenderMode::SelectDistinct, RenderMode::Count] {
            assert_eq!(
                render(&query, mode, Some("id")),
                render(&query.clone(), mode, Some("id"))
            );
        }
    }
}
