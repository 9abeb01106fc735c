//! Connectors
//!
//! Connectors sit between callers and backends. They render queries, consult
//! the caches and hand rendered text to a transport:
//!
//! - **sql**: `SqlConnector` over any `SqlTransport`
//! - **timeseries**: `TimeSeriesConnector` over any `TimeSeriesTransport`
//! - **influx_http**: `InfluxHttp`, the InfluxDB v2 REST transport
//! - **registry**: `ConnectorRegistry`, connectors by name
//!
//! # Example
//!
//! ```rust,no_run
//! use dualquery::cache::ReadOptions;
//! use dualquery::config::Config;
//! use dualquery::connector::{ConnectorRegistry, TimeSeriesConnector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let registry = ConnectorRegistry::new();
//!     registry
//!         .define(TimeSeriesConnector::connect(&config.influx).await?)
//!         .await;
//!
//!     let metrics = registry.time_series(&config.influx.name).await?;
//!     let request = metrics.request().measurement("cpu");
//!     let rows = metrics.read(&request, ReadOptions::new()).await?;
//!     println!("{} rows", rows.len());
//!     Ok(())
//! }
//! ```

mod annotated_csv;
mod error;
mod influx_http;
mod registry;
mod sql;
mod timeseries;
mod transport;

pub use annotated_csv::parse_annotated_csv;
pub use error::{ConnectorError, ConnectorResult};
pub use influx_http::InfluxHttp;
pub use registry::{ConnectorHandle, ConnectorRegistry};
pub use sql::SqlConnector;
pub use timeseries::{TimeSeriesConnector, DEFAULT_MEASUREMENT};
pub use transport::{SqlTransport, TimeSeriesTransport};
