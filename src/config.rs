//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub influx: InfluxConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Time-series backend connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct InfluxConfig {
    /// Connector name in the registry
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub organization: String,

    #[serde(default)]
    pub bucket: String,

    /// Measurement used by writes that do not name one
    #[serde(default = "default_measurement")]
    pub default_measurement: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_name() -> String {
    "default".to_string()
}

fn default_host() -> String {
    "http://localhost".to_string()
}

fn default_port() -> u16 {
    8086
}

fn default_measurement() -> String {
    "point".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl InfluxConfig {
    /// Base URL of the backend, `host:port`
    pub fn url(&self) -> String {
        format!("{}:{}", self.host.trim_end_matches('/'), self.port)
    }
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            host: default_host(),
            port: default_port(),
            token: String::new(),
            organization: String::new(),
            bucket: String::new(),
            default_measurement: default_measurement(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Connector-level result cache defaults
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CacheConfig {
    /// Always skip the lookup, still storing fresh results
    #[serde(default)]
    pub force_refresh: bool,

    /// Never consult the cache
    #[serde(default)]
    pub ignore_cache: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("dualquery").join("config.toml")),
            Some(PathBuf::from("/etc/dualquery/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // Influx overrides
        if let Ok(host) = std::env::var("DUALQUERY_INFLUX_HOST") {
            self.influx.host = host;
        }
        if let Ok(port) = std::env::var("DUALQUERY_INFLUX_PORT") {
            if let Ok(p) = port.parse() {
                self.influx.port = p;
            }
        }
        if let Ok(token) = std::env::var("DUALQUERY_INFLUX_TOKEN") {
            self.influx.token = token;
        }
        if let Ok(org) = std::env::var("DUALQUERY_INFLUX_ORG") {
            self.influx.organization = org;
        }
        if let Ok(bucket) = std::env::var("DUALQUERY_INFLUX_BUCKET") {
            self.influx.bucket = bucket;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("DUALQUERY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("DUALQUERY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# dualquery configuration
#
# Environment variables override these settings:
# - DUALQUERY_INFLUX_HOST
# - DUALQUERY_INFLUX_PORT
# - DUALQUERY_INFLUX_TOKEN
# - DUALQUERY_INFLUX_ORG
# - DUALQUERY_INFLUX_BUCKET
# - DUALQUERY_LOG_LEVEL
# - DUALQUERY_LOG_FORMAT

[influx]
# Connector name
name = "default"

# Backend host and port
host = "http://localhost"
port = 8086

# API token
token = ""

# Organization and bucket used for reads and writes
organization = ""
bucket = ""

# Measurement for writes that do not name one
default_measurement = "point"

# Request timeout in seconds
request_timeout_secs = 30

[cache]
# Skip result cache lookups but keep storing fresh results
force_refresh = false

# Never consult the result cache
ignore_cache = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
