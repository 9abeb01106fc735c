//! Backend transport traits
//!
//! Connectors render queries and manage caches; transports move the rendered
//! text to a backend and bring rows back. Each call is a suspension point
//! and may fail with whatever the transport reports.

use super::error::ConnectorResult;
use crate::flux::{Bucket, FluxTable, Organization, WritePrecision};
use crate::schema::Row;
use async_trait::async_trait;

/// Executes rendered SQL
#[async_trait]
pub trait SqlTransport: Send + Sync {
    /// Run a reading statement and return its rows
    async fn query(&self, sql: &str) -> ConnectorResult<Vec<Row>>;

    /// Run a writing statement and return the affected row count
    async fn execute(&self, sql: &str) -> ConnectorResult<u64>;

    /// Id generated by the last INSERT, when the backend exposes one
    fn last_insert_id(&self) -> Option<u64> {
        None
    }
}

/// Talks to a Flux-speaking time-series backend
#[async_trait]
pub trait TimeSeriesTransport: Send + Sync {
    /// Run a Flux query on behalf of an organization
    async fn query(&self, flux: &str, organization: &str) -> ConnectorResult<Vec<FluxTable>>;

    /// Look up an organization by name
    async fn find_organization(&self, name: &str) -> ConnectorResult<Option<Organization>>;

    /// Look up a bucket by name
    async fn find_bucket(&self, name: &str) -> ConnectorResult<Option<Bucket>>;

    /// Create a bucket
    async fn create_bucket(&self, name: &str, org_id: Option<&str>) -> ConnectorResult<Bucket>;

    /// Write line protocol to a bucket
    async fn write(
        &self,
        lines: &[String],
        bucket: &str,
        organization: &str,
        precision: WritePrecision,
    ) -> ConnectorResult<()>;
}
