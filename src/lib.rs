//! # dualquery
//!
//! A data-access layer that renders abstract queries for two backend
//! families and caches what comes back:
//!
//! - relational stores, through SQL text with typed field serialization
//! - Flux time-series stores, through pipe-forward queries and line protocol
//!
//! ## Modules
//!
//! - [`schema`]: field kinds, descriptors and values
//! - [`serializer`]: typed value → backend literal
//! - [`sql`]: abstract query → SQL statement
//! - [`flux`]: read request → Flux query, rows → line protocol
//! - [`cache`]: existence and query result caches
//! - [`connector`]: SQL and time-series connectors, transports, registry
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dualquery::connector::TimeSeriesConnector;
//! use dualquery::flux::WriteRow;
//! use dualquery::{Config, ReadOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let metrics = TimeSeriesConnector::connect(&config.influx).await?;
//!
//!     // Creates the bucket on first use
//!     metrics
//!         .write(&[WriteRow::new().tag("host", "a").field("value", 42i64)], None)
//!         .await?;
//!
//!     let rows = metrics
//!         .read(&metrics.request().measurement("point"), ReadOptions::new())
//!         .await?;
//!     println!("Found {} rows", rows.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod connector;
pub mod flux;
pub mod schema;
pub mod serializer;
pub mod sql;

// Re-export top-level types for convenience
pub use cache::{CacheStats, ExistenceCache, QueryCache, ReadOptions};

pub use config::{CacheConfig, Config, ConfigError, InfluxConfig, LoggingConfig};

pub use connector::{
    ConnectorError, ConnectorHandle, ConnectorRegistry, ConnectorResult, InfluxHttp,
    SqlConnector, SqlTransport, TimeSeriesConnector, TimeSeriesTransport,
};

pub use flux::{render_read, ReadRequest, WriteRow};

pub use schema::{FieldDescriptor, FieldKind, Row, Schema, SchemaProvider, Value};

pub use serializer::{prepare_data_to_store, serialize};

pub use sql::{render, AbstractQuery, RenderMode};
