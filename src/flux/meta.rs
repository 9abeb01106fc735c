//! Time-series backend metadata

use serde::{Deserialize, Serialize};

/// An organization as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Backend identifier
    pub id: String,
    /// Organization name
    pub name: String,
}

impl Organization {
    /// Create an organization
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A bucket as reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Backend identifier
    #[serde(default)]
    pub id: String,
    /// Bucket name
    pub name: String,
    /// Owning organization id
    #[serde(default, rename = "orgID")]
    pub org_id: Option<String>,
}

/// Timestamp precision for writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePrecision {
    /// Seconds
    #[default]
    S,
    /// Milliseconds
    Ms,
    /// Microseconds
    Us,
    /// Nanoseconds
    Ns,
}

impl std::fmt::Display for WritePrecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::S => write!(f, "s"),
            Self::Ms => write!(f, "ms"),
            Self::Us => write!(f, "us"),
            Self::Ns => write!(f, "ns"),
        }
    }
}
