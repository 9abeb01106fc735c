//! Connector error types
//!
//! Transport failures are surfaced to callers as-is; the connector adds no
//! retries of its own.

use thiserror::Error;

/// Errors raised by connectors and their transports
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// The backend could not be reached or the connector is detached
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The backend rejected a request
    #[error("Backend error: {0}")]
    Backend(String),

    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A backend response could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Unknown connector or resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation not available on this connector
    #[error("Operation not supported: {0}")]
    Unsupported(String),
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::Decode(err.to_string())
    }
}

impl From<csv::Error> for ConnectorError {
    fn from(err: csv::Error) -> Self {
        ConnectorError::Decode(err.to_string())
    }
}

/// Result type for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;
