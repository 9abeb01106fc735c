//! Caches that avoid redundant backend round-trips
//!
//! - **existence**: organization/bucket lookups, owned by one connector
//! - **result**: row sets keyed by (connector, rendered query), shared
//!
//! Both guard their maps with Tokio's `RwLock`. A check-then-fetch sequence
//! is not atomic: two concurrent misses may both hit the backend, and the
//! last write wins.

mod existence;
mod result;

pub use existence::ExistenceCache;
pub use result::{CacheKey, CacheStats, CachedResult, QueryCache, ReadOptions};
