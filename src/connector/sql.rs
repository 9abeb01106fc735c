//! Relational connector
//!
//! Renders abstract queries, serves reads through the shared result cache
//! and forwards writes to the SQL transport.
//!
//! ```text
//! AbstractQuery → render → cache lookup → (miss) transport.query → cache store → rows
//! ```

use super::error::ConnectorResult;
use super::transport::SqlTransport;
use crate::cache::{QueryCache, ReadOptions};
use crate::schema::{Row, SchemaProvider, Value};
use crate::serializer::prepare_data_to_store;
use crate::sql::{extract_schema_columns, render, AbstractQuery, RenderMode};
use std::collections::HashMap;
use std::sync::Arc;

/// Connector for a SQL backend
pub struct SqlConnector {
    name: String,
    transport: Arc<dyn SqlTransport>,
    results: Arc<QueryCache>,
    defaults: ReadOptions,
}

impl SqlConnector {
    /// Create a connector with its own result cache
    pub fn new(name: impl Into<String>, transport: Arc<dyn SqlTransport>) -> Self {
        Self {
            name: name.into(),
            transport,
            results: Arc::new(QueryCache::new()),
            defaults: ReadOptions::default(),
        }
    }

    /// Builder method: share a result cache
    pub fn result_cache(mut self, cache: Arc<QueryCache>) -> Self {
        self.results = cache;
        self
    }

    /// Builder method: connector-level cache overrides
    pub fn read_defaults(mut self, defaults: ReadOptions) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.results
    }

    /// SELECT rows
    pub async fn select(
        &self,
        query: &AbstractQuery,
        options: ReadOptions,
    ) -> ConnectorResult<Vec<Row>> {
        self.cached_read(render(query, RenderMode::Select, None), options)
            .await
    }

    /// SELECT DISTINCT rows
    pub async fn select_distinct(
        &self,
        query: &AbstractQuery,
        options: ReadOptions,
    ) -> ConnectorResult<Vec<Row>> {
        self.cached_read(render(query, RenderMode::SelectDistinct, None), options)
            .await
    }

    /// Count matching rows, optionally counting distinct values of a field
    pub async fn count(
        &self,
        query: &AbstractQuery,
        field: Option<&str>,
        distinct: bool,
        options: ReadOptions,
    ) -> ConnectorResult<u64> {
        let mode = if distinct {
            RenderMode::CountDistinct
        } else {
            RenderMode::Count
        };
        let rows = self.cached_read(render(query, mode, field), options).await?;

        Ok(rows
            .first()
            .and_then(|row| row.get("Count"))
            .and_then(|count| match count {
                serde_json::Value::Number(n) => n.as_u64(),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .unwrap_or(0))
    }

    /// INSERT the query's assignments; returns the generated id if known
    pub async fn insert(&self, query: &AbstractQuery) -> ConnectorResult<Option<u64>> {
        let affected = self.execute(&render(query, RenderMode::Insert, None)).await?;
        if affected == 0 {
            return Ok(None);
        }
        Ok(self.transport.last_insert_id())
    }

    /// UPDATE the query's assignments; returns affected rows
    pub async fn update(&self, query: &AbstractQuery) -> ConnectorResult<u64> {
        self.execute(&render(query, RenderMode::Update, None)).await
    }

    /// DELETE matching rows; returns affected rows
    pub async fn delete(&self, query: &AbstractQuery) -> ConnectorResult<u64> {
        self.execute(&render(query, RenderMode::Delete, None)).await
    }

    /// Id generated by the last INSERT, if the backend exposes one
    pub fn last_insert_id(&self) -> Option<u64> {
        self.transport.last_insert_id()
    }

    /// Read columns for a schema's direct-column fields
    pub fn extract_schema_columns<S: SchemaProvider + ?Sized>(&self, schema: &S) -> Vec<String> {
        extract_schema_columns(schema)
    }

    /// A query over a schema's table selecting all of its read columns
    pub fn schema_query<S: SchemaProvider + ?Sized>(&self, schema: &S) -> AbstractQuery {
        AbstractQuery::new(schema.table()).columns(extract_schema_columns(schema))
    }

    /// Serialize a logical write map into column assignments
    pub fn prepare_data_to_store<S: SchemaProvider + ?Sized>(
        &self,
        schema: &S,
        data: &HashMap<String, Value>,
    ) -> Vec<(String, String)> {
        prepare_data_to_store(schema, data)
    }

    async fn execute(&self, sql: &str) -> ConnectorResult<u64> {
        if sql.is_empty() {
            return Ok(0);
        }
        tracing::debug!(connector = %self.name, sql = %sql, "Executing statement");
        self.transport.execute(sql).await
    }

    async fn cached_read(&self, sql: String, options: ReadOptions) -> ConnectorResult<Vec<Row>> {
        if sql.is_empty() {
            return Ok(Vec::new());
        }

        let options = options.or(self.defaults);
        if !options.bypasses_lookup() {
            if let Some(rows) = self.results.get(&self.name, &sql).await {
                tracing::debug!(connector = %self.name, "Result cache hit");
                return Ok(rows);
            }
        }

        tracing::debug!(
            connector = %self.name,
            force_refresh = options.force_refresh,
            ignore_cache = options.ignore_cache,
            "Querying backend"
        );
        let rows = self.transport.query(&sql).await?;
        self.results.set(&self.name, &sql, rows.clone()).await;
        Ok(rows)
    }
}
