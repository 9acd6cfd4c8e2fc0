//! Decorator that never lets a cache error escape (spec §4.1 "Safe
//! wrapper").

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::store::{CacheStore, Ttl};

/// Wraps any [`CacheStore`] and converts every error into the method's
/// neutral fallback, logging a structured warning instead of propagating.
pub struct SafeCache<T> {
    inner: T,
    pub(crate) cache_type: &'static str,
}

impl<T: CacheStore> SafeCache<T> {
    pub fn new(inner: T, cache_type: &'static str) -> Self {
        Self { inner, cache_type }
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.inner.get(key).await {
            Ok(v) => v,
            Err(err) => {
                warn!(cache_type = self.cache_type, %key, %err, "cache get failed, returning null");
                None
            }
        }
    }

    pub async fn get_json<V: DeserializeOwned>(&self, key: &str) -> Option<V> {
        let bytes = self.get(key).await?;
        match serde_json::from_slice(&bytes) {
            Ok(v) => Some(v),
            Err(err) => {
                warn!(cache_type = self.cache_type, %key, %err, "cache value failed to deserialize");
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Ttl) {
        if let Err(err) = self.inner.set(key, value, ttl).await {
            warn!(cache_type = self.cache_type, %key, %err, "cache set failed");
        }
    }

    pub async fn set_json<V: Serialize>(&self, key: &str, value: &V, ttl: Ttl) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, bytes, ttl).await,
            Err(err) => warn!(cache_type = self.cache_type, %key, %err, "cache value failed to serialize"),
        }
    }

    pub async fn multi_set(&self, entries: Vec<(String, Vec<u8>)>, ttl: Ttl) {
        if let Err(err) = self.inner.multi_set(entries, ttl).await {
            warn!(cache_type = self.cache_type, %err, "cache multi_set failed");
        }
    }

    pub async fn delete(&self, key: &str) {
        if let Err(err) = self.inner.delete(key).await {
            warn!(cache_type = self.cache_type, %key, %err, "cache delete failed");
        }
    }

    pub async fn clear(&self) {
        if let Err(err) = self.inner.clear().await {
            warn!(cache_type = self.cache_type, %err, "cache clear failed");
        }
    }

    pub async fn incr_by(&self, key: &str, delta: i64) -> i64 {
        match self.inner.incr_by(key, delta).await {
            Ok(v) => v,
            Err(err) => {
                warn!(cache_type = self.cache_type, %key, %err, "cache incrBy failed, returning 0");
                0
            }
        }
    }

    pub async fn r_push(&self, key: &str, value: Vec<u8>) -> usize {
        match self.inner.r_push(key, value).await {
            Ok(v) => v,
            Err(err) => {
                warn!(cache_type = self.cache_type, %key, %err, "cache rPush failed, returning 0");
                0
            }
        }
    }

    pub async fn l_range(&self, key: &str, start: i64, end: i64) -> Vec<Vec<u8>> {
        match self.inner.l_range(key, start, end).await {
            Ok(v) => v,
            Err(err) => {
                warn!(cache_type = self.cache_type, %key, %err, "cache lRange failed, returning empty");
                Vec::new()
            }
        }
    }

    pub async fn keys(&self, pattern: &str) -> Vec<String> {
        match self.inner.keys(pattern).await {
            Ok(v) => v,
            Err(err) => {
                warn!(cache_type = self.cache_type, %pattern, %err, "cache keys failed, returning empty");
                Vec::new()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
