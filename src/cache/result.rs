//! Query result cache
//!
//! Keeps the most recent row set per (connector name, rendered query). There
//! is no TTL and no eviction: an entry only changes when the same query is
//! fetched again. Share one cache between connectors with an `Arc`.

use crate::schema::Row;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Cache key: connector name plus the exact rendered query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Name of the connector that ran the query
    pub connector: String,
    /// Rendered query text, byte for byte
    pub query: String,
}

impl CacheKey {
    /// Create a key
    pub fn new(connector: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            connector: connector.into(),
            query: query.into(),
        }
    }
}

/// The latest results stored for one key
#[derive(Debug, Clone)]
pub struct CachedResult {
    /// Rows as returned by the backend
    pub rows: Vec<Row>,
    /// When the rows were stored
    pub stored_at: DateTime<Utc>,
}

/// Per-call cache overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Skip the lookup but store the fresh result
    pub force_refresh: bool,
    /// Skip the lookup
    pub ignore_cache: bool,
}

impl ReadOptions {
    /// Options that consult the cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: force a backend round-trip
    pub fn force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }

    /// Builder method: do not consult the cache
    pub fn ignore_cache(mut self) -> Self {
        self.ignore_cache = true;
        self
    }

    /// Combine with connector-level defaults; a flag set on either side wins
    pub fn or(self, defaults: ReadOptions) -> Self {
        Self {
            force_refresh: self.force_refresh || defaults.force_refresh,
            ignore_cache: self.ignore_cache || defaults.ignore_cache,
        }
    }

    /// Whether the cache lookup must be skipped
    pub fn bypasses_lookup(&self) -> bool {
        self.force_refresh || self.ignore_cache
    }
}

/// Shared result cache
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<CacheKey, CachedResult>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether rows are stored for this key
    pub async fn isset(&self, connector: &str, query: &str) -> bool {
        self.entries
            .read()
            .await
            .contains_key(&CacheKey::new(connector, query))
    }

    /// Stored rows for this key, counting the hit or miss
    pub async fn get(&self, connector: &str, query: &str) -> Option<Vec<Row>> {
        let entries = self.entries.read().await;
        match entries.get(&CacheKey::new(connector, query)) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.rows.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store rows for this key, replacing any previous entry
    pub async fn set(&self, connector: &str, query: &str, rows: Vec<Row>) {
        let entry = CachedResult {
            rows,
            stored_at: Utc::now(),
        };
        self.entries
            .write()
            .await
            .insert(CacheKey::new(connector, query), entry);
    }

    /// The full entry for this key
    pub async fn entry(&self, connector: &str, query: &str) -> Option<CachedResult> {
        self.entries
            .read()
            .await
            .get(&CacheKey::new(connector, query))
            .cloned()
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Current entry count and lookup counters
    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len().await,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Result cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Stored entries
    pub entries: usize,
    /// Lookups that found rows
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
}

impl CacheStats {
    /// Hits over lookups, 0.0 before the first lookup
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "entries={}, hits={}, misses={}, hit_ratio={:.2}",
            self.entries,
            self.hits,
            self.misses,
            self.hit_ratio()
        )
    }
}
