//! Existence cache for time-series metadata
//!
//! Remembers organization lookups and bucket existence per connector so each
//! name costs at most one backend round-trip. Negative answers are cached
//! too. Entries are only ever changed by another lookup or by a successful
//! bucket creation; a bucket deleted out-of-band stays cached as existing.

use crate::flux::Organization;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Per-connector memo of organization and bucket lookups
#[derive(Debug, Default)]
pub struct ExistenceCache {
    /// organization name → resolved organization (`None` = not found)
    organizations: RwLock<HashMap<String, Option<Organization>>>,
    /// bucket name → exists
    buckets: RwLock<HashMap<String, bool>>,
}

impl ExistenceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached bucket existence; `None` means not looked up yet
    pub async fn bucket(&self, name: &str) -> Option<bool> {
        self.buckets.read().await.get(name).copied()
    }

    /// Record bucket existence
    pub async fn set_bucket(&self, name: &str, exists: bool) {
        self.buckets.write().await.insert(name.to_string(), exists);
    }

    /// Cached organization lookup
    ///
    /// `None` means not looked up yet, `Some(None)` a cached "not found".
    pub async fn organization(&self, name: &str) -> Option<Option<Organization>> {
        self.organizations.read().await.get(name).cloned()
    }

    /// Record an organization lookup result
    pub async fn set_organization(&self, name: &str, organization: Option<Organization>) {
        self.organizations
            .write()
            .await
            .insert(name.to_string(), organization);
    }

    /// Number of cached bucket entries
    pub async fn bucket_count(&self) -> usize {
        self.buckets.read().await.len()
    }

    /// Number of cached organization entries
    pub async fn organization_count(&self) -> usize {
        self.organizations.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bucket_entries() {
        let cache = ExistenceCache::new();
        assert_eq!(cache.bucket("metrics").await, None);

        cache.set_bucket("metrics", false).await;
        assert_eq!(cache.bucket("metrics").await, Some(false));

        cache.set_bucket("metrics", true).await;
        assert_eq!(cache.bucket("metrics").await, Some(true));
        assert_eq!(cache.bucket_count().await, 1);
    }

    #[tokio::test]
    async fn test_negative_organization_is_distinct_from_unknown() {
        let cache = ExistenceCache::new();
        assert_eq!(cache.organization("acme").await, None);

        cache.set_organization("acme", None).await;
        assert_eq!(cache.organization("acme").await, Some(None));

        let org = Organization::new("0a1b", "acme");
        cache.set_organization("acme", Some(org.clone())).await;
        assert_eq!(cache.organization("acme").await, Some(Some(org)));
        assert_eq!(cache.organization_count().await, 1);
    }
}
