//! Named connector registry
//!
//! A process-scoped service mapping connector names to connectors. Create one
//! at startup and pass it (usually in an `Arc`) to whatever needs lookups.

use super::error::{ConnectorError, ConnectorResult};
use super::sql::SqlConnector;
use super::timeseries::TimeSeriesConnector;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A registered connector of either backend family
#[derive(Clone)]
pub enum ConnectorHandle {
    Sql(Arc<SqlConnector>),
    TimeSeries(Arc<TimeSeriesConnector>),
}

impl ConnectorHandle {
    /// Name the connector was created with
    pub fn name(&self) -> &str {
        match self {
            Self::Sql(c) => c.name(),
            Self::TimeSeries(c) => c.name(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sql(_) => "sql",
            Self::TimeSeries(_) => "time-series",
        }
    }
}

impl From<SqlConnector> for ConnectorHandle {
    fn from(connector: SqlConnector) -> Self {
        Self::Sql(Arc::new(connector))
    }
}

impl From<TimeSeriesConnector> for ConnectorHandle {
    fn from(connector: TimeSeriesConnector) -> Self {
        Self::TimeSeries(Arc::new(connector))
    }
}

/// Registry of connectors by name
#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: RwLock<HashMap<String, ConnectorHandle>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector under its own name, returning any it replaced
    pub async fn define(&self, connector: impl Into<ConnectorHandle>) -> Option<ConnectorHandle> {
        let handle = connector.into();
        let name = handle.name().to_string();
        tracing::debug!(connector = %name, kind = handle.kind(), "Defined connector");
        self.connectors.write().await.insert(name, handle)
    }

    /// Look up a connector by name
    pub async fn get(&self, name: &str) -> ConnectorResult<ConnectorHandle> {
        self.connectors
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| ConnectorError::NotFound(format!("Connector '{}' doesn't exist", name)))
    }

    /// Look up a SQL connector by name
    pub async fn sql(&self, name: &str) -> ConnectorResult<Arc<SqlConnector>> {
        match self.get(name).await? {
            ConnectorHandle::Sql(connector) => Ok(connector),
            ConnectorHandle::TimeSeries(_) => Err(ConnectorError::Unsupported(format!(
                "Connector '{}' is not a sql connector",
                name
            ))),
        }
    }

    /// Look up a time-series connector by name
    pub async fn time_series(&self, name: &str) -> ConnectorResult<Arc<TimeSeriesConnector>> {
        match self.get(name).await? {
            ConnectorHandle::TimeSeries(connector) => Ok(connector),
            ConnectorHandle::Sql(_) => Err(ConnectorError::Unsupported(format!(
                "Connector '{}' is not a time-series connector",
                name
            ))),
        }
    }

    pub async fn remove(&self, name: &str) -> Option<ConnectorHandle> {
        self.connectors.write().await.remove(name)
    }

    /// Registered names, sorted
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.connectors.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}
