//! Time-series connector
//!
//! Owns the connection to a Flux backend, the existence cache for its
//! organization and buckets, and a handle on the shared result cache.
//!
//! Every read and write first makes sure the target bucket exists, creating
//! it when missing. Reads are then served from the result cache unless the
//! caller (or the connector defaults) ask to bypass it.

use super::error::{ConnectorError, ConnectorResult};
use super::influx_http::InfluxHttp;
use super::transport::TimeSeriesTransport;
use crate::cache::{ExistenceCache, QueryCache, ReadOptions};
use crate::config::InfluxConfig;
use crate::flux::{
    collect_rows, render_lines, render_read, Bucket, Organization, ReadRequest, WritePrecision,
    WriteRow,
};
use crate::schema::Row;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Measurement used when neither the caller nor the config name one
pub const DEFAULT_MEASUREMENT: &str = "point";

/// Connector for a Flux-speaking time-series backend
pub struct TimeSeriesConnector {
    name: String,
    organization: String,
    bucket: String,
    default_measurement: String,
    transport: RwLock<Option<Arc<dyn TimeSeriesTransport>>>,
    existence: ExistenceCache,
    results: Arc<QueryCache>,
    defaults: ReadOptions,
}

impl TimeSeriesConnector {
    /// Create a detached connector; call [`attach`](Self::attach) or use
    /// [`connect`](Self::connect) to get a working one
    pub fn new(
        name: impl Into<String>,
        organization: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            organization: organization.into(),
            bucket: bucket.into(),
            default_measurement: DEFAULT_MEASUREMENT.to_string(),
            transport: RwLock::new(None),
            existence: ExistenceCache::new(),
            results: Arc::new(QueryCache::new()),
            defaults: ReadOptions::default(),
        }
    }

    /// Detached connector built from connection settings
    pub fn from_config(config: &InfluxConfig) -> Self {
        Self::new(&config.name, &config.organization, &config.bucket)
            .default_measurement(&config.default_measurement)
    }

    /// Open an HTTP connection and return an attached connector
    ///
    /// An unreachable backend fails immediately with
    /// [`ConnectorError::Connection`].
    pub async fn connect(config: &InfluxConfig) -> ConnectorResult<Self> {
        let http = InfluxHttp::connect(config).await?;
        let connector = Self::from_config(config);
        connector.attach(Arc::new(http)).await;
        Ok(connector)
    }

    /// Builder method: measurement for writes that do not name one
    pub fn default_measurement(mut self, measurement: impl Into<String>) -> Self {
        let measurement = measurement.into();
        if !measurement.trim().is_empty() {
            self.default_measurement = measurement;
        }
        self
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

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.results
    }

    pub fn existence(&self) -> &ExistenceCache {
        &self.existence
    }

    /// Use a transport for all further calls
    pub async fn attach(&self, transport: Arc<dyn TimeSeriesTransport>) {
        *self.transport.write().await = Some(transport);
    }

    /// Drop the transport; later backend calls fail with "not connected"
    pub async fn disconnect(&self) {
        if self.transport.write().await.take().is_some() {
            tracing::info!(connector = %self.name, "Disconnected");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.transport.read().await.is_some()
    }

    async fn transport(&self) -> ConnectorResult<Arc<dyn TimeSeriesTransport>> {
        self.transport
            .read()
            .await
            .clone()
            .ok_or_else(|| ConnectorError::Connection("not connected".to_string()))
    }

    /// Resolve the configured organization, at most once per connector
    pub async fn find_my_org(&self) -> ConnectorResult<Option<Organization>> {
        if let Some(cached) = self.existence.organization(&self.organization).await {
            tracing::debug!(connector = %self.name, organization = %self.organization, "Existence cache hit");
            return Ok(cached);
        }

        let found = self
            .transport()
            .await?
            .find_organization(&self.organization)
            .await?;
        tracing::debug!(
            connector = %self.name,
            organization = %self.organization,
            found = found.is_some(),
            "Existence cache miss"
        );
        self.existence
            .set_organization(&self.organization, found.clone())
            .await;
        Ok(found)
    }

    /// Whether a bucket exists, at most one backend lookup per name
    pub async fn bucket_exists(&self, name: &str) -> ConnectorResult<bool> {
        if let Some(exists) = self.existence.bucket(name).await {
            tracing::debug!(connector = %self.name, bucket = %name, exists, "Existence cache hit");
            return Ok(exists);
        }

        let exists = self.transport().await?.find_bucket(name).await?.is_some();
        tracing::debug!(connector = %self.name, bucket = %name, exists, "Existence cache miss");
        self.existence.set_bucket(name, exists).await;
        Ok(exists)
    }

    /// Create a bucket under the configured organization
    pub async fn create_bucket(&self, name: &str) -> ConnectorResult<Bucket> {
        let org_id = self.find_my_org().await?.map(|org| org.id);
        let bucket = self
            .transport()
            .await?
            .create_bucket(name, org_id.as_deref())
            .await?;

        self.existence.set_bucket(name, true).await;
        tracing::info!(connector = %self.name, bucket = %name, "Created bucket");
        Ok(bucket)
    }

    /// Create a bucket unless it is known to exist
    pub async fn ensure_bucket(&self, name: &str) -> ConnectorResult<()> {
        if !self.bucket_exists(name).await? {
            self.create_bucket(name).await?;
        }
        Ok(())
    }

    /// A read over the configured bucket from the earliest instant
    pub fn request(&self) -> ReadRequest {
        ReadRequest::new(&self.bucket)
            .organization(&self.organization)
            .from_beginning()
    }

    /// Execute a read, grouping records into one row per time
    pub async fn read(
        &self,
        request: &ReadRequest,
        options: ReadOptions,
    ) -> ConnectorResult<Vec<Row>> {
        let mut request = request.clone();
        if request.bucket.trim().is_empty() {
            request.bucket = self.bucket.clone();
        }
        if request.organization.trim().is_empty() {
            request.organization = self.organization.clone();
        }

        self.ensure_bucket(&request.bucket).await?;

        let flux = render_read(&request);
        // The same Flux text yields different rows per organization
        let cache_query = format!("{}\n{}", request.organization, flux);
        let options = options.or(self.defaults);
        if !options.bypasses_lookup() {
            if let Some(rows) = self.results.get(&self.name, &cache_query).await {
                tracing::debug!(connector = %self.name, "Result cache hit");
                return Ok(rows);
            }
        }

        let tables = self
            .transport()
            .await?
            .query(&flux, &request.organization)
            .await?;
        let (rows, untimed) = collect_rows(&tables);
        if untimed > 0 {
            tracing::warn!(
                connector = %self.name,
                records = untimed,
                "Records without a valid time value grouped into one row"
            );
        }

        tracing::debug!(connector = %self.name, rows = rows.len(), "Storing result");
        self.results.set(&self.name, &cache_query, rows.clone()).await;
        Ok(rows)
    }

    /// First row of a read, or an empty row
    pub async fn first(&self, request: &ReadRequest, options: ReadOptions) -> ConnectorResult<Row> {
        let rows = self
            .read(&request.clone().stage("first()"), options)
            .await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    /// Last row of a read, or an empty row
    pub async fn last(&self, request: &ReadRequest, options: ReadOptions) -> ConnectorResult<Row> {
        let rows = self.read(&request.clone().stage("last()"), options).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    /// Raw queries are not supported; always an empty row set
    pub async fn query(&self, raw: &str) -> ConnectorResult<Vec<Row>> {
        tracing::debug!(connector = %self.name, query = %raw, "Raw query ignored");
        Ok(Vec::new())
    }

    /// Write rows to the configured bucket; returns the number of lines sent
    ///
    /// A blank measurement falls back to the connector default. Rows without
    /// a time are stamped with the current time in seconds.
    pub async fn write(&self, rows: &[WriteRow], measurement: Option<&str>) -> ConnectorResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        self.ensure_bucket(&self.bucket).await?;

        let measurement = measurement
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_measurement);
        let lines = render_lines(measurement, rows, Utc::now().timestamp());

        self.transport()
            .await?
            .write(&lines, &self.bucket, &self.organization, WritePrecision::S)
            .await?;

        tracing::debug!(connector = %self.name, measurement, lines = lines.len(), "Wrote points");
        Ok(lines.len())
    }

    /// Write a JSON object or array of objects
    pub async fn write_json(
        &self,
        data: &serde_json::Value,
        measurement: Option<&str>,
    ) -> ConnectorResult<usize> {
        let values: Vec<&serde_json::Value> = match data {
            serde_json::Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        let rows = values
            .into_iter()
            .map(|value| {
                WriteRow::from_json(value).ok_or_else(|| {
                    ConnectorError::Decode(format!("expected a JSON object, got {}", value))
                })
            })
            .collect::<ConnectorResult<Vec<_>>>()?;

        self.write(&rows, measurement).await
    }
}
