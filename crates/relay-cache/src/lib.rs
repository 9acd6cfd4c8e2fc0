//! Two-tier cache layer (spec §4.1): local LRU, optional shared remote,
//! and the safe/measurable decorators every caller actually uses.

pub mod error;
pub mod glob;
pub mod local;
pub mod measured;
pub mod safe;
pub mod shared;
pub mod store;

use std::{sync::Arc, time::Duration};

pub use error::CacheError;
pub use local::{LocalLruCache, ReservedCache};
pub use measured::MeasurableCache;
pub use safe::SafeCache;
pub use shared::SharedCache;
pub use store::{CacheStore, Ttl};

/// The cache surface the rest of the relay depends on: a measured, safe
/// main store plus the never-evicted reserved-key store, picking local or
/// shared backing at construction time (spec §4.1, "Two concrete
/// implementations exist").
pub struct RelayCache {
    main: MeasurableCache<Arc<dyn CacheStore>>,
    reserved: MeasurableCache<Arc<dyn CacheStore>>,
}

impl RelayCache {
    pub fn local(max_entries: u32, default_ttl: Duration) -> Self {
        let main: Arc<dyn CacheStore> = Arc::new(LocalLruCache::new(max_entries, default_ttl));
        let reserved: Arc<dyn CacheStore> = Arc::new(ReservedCache::new());
        Self {
            main: MeasurableCache::new(main, "local"),
            reserved: MeasurableCache::new(reserved, "local-reserved"),
        }
    }

    pub fn shared(shared: SharedCache) -> Self {
        let shared: Arc<dyn CacheStore> = Arc::new(shared);
        let reserved: Arc<dyn CacheStore> = Arc::new(ReservedCache::new());
        Self {
            main: MeasurableCache::new(shared, "redis"),
            reserved: MeasurableCache::new(reserved, "local-reserved"),
        }
    }

    pub fn main(&self) -> &MeasurableCache<Arc<dyn CacheStore>> {
        &self.main
    }

    pub fn reserved(&self) -> &MeasurableCache<Arc<dyn CacheStore>> {
        &self.reserved
    }
}

#[async_trait::async_trait]
impl CacheStore for Arc<dyn CacheStore> {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Ttl) -> Result<(), CacheError> {
        (**self).set(key, value, ttl).await
    }

    async fn multi_set(&self, entries: Vec<(String, Vec<u8>)>, ttl: Ttl) -> Result<(), CacheError> {
        (**self).multi_set(entries, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key).await
    }

    async fn clear(&self) -> Result<(), CacheError> {
        (**self).clear().await
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, CacheError> {
        (**self).incr_by(key, delta).await
    }

    async fn r_push(&self, key: &str, value: Vec<u8>) -> Result<usize, CacheError> {
        (**self).r_push(key, value).await
    }

    async fn l_range(&self, key: &str, start: i64, end: i64) -> Result<Vec<Vec<u8>>, CacheError> {
        (**self).l_range(key, start, end).await
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        (**self).keys(pattern).await
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}
