//! Metrics decorator around [`SafeCache`] (spec §4.1 "Measurable wrapper").
//!
//! The source system's worker threads cannot touch the parent's metric
//! registry directly and must post a typed message across the worker
//! boundary for the parent to apply. `relay-workers` tasks are plain
//! `tokio` tasks in the same address space as the registry, so that
//! indirection isn't needed here: `metrics::counter!` already targets a
//! process-global recorder and is safe to call from any task, including one
//! spawned onto the worker pool (see `relay-workers::pool`).

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    safe::SafeCache,
    store::{CacheStore, Ttl},
};

pub struct MeasurableCache<T> {
    safe: SafeCache<T>,
}

impl<T: CacheStore> MeasurableCache<T> {
    pub fn new(inner: T, cache_type: &'static str) -> Self {
        Self { safe: SafeCache::new(inner, cache_type) }
    }

    fn record(&self, calling_method: &str, method: &'static str) {
        relay_metrics::record_cache_call(calling_method, self.safe.cache_type, method);
    }

    pub async fn get(&self, key: &str, calling_method: &str) -> Option<Vec<u8>> {
        self.record(calling_method, "get");
        self.safe.get(key).await
    }

    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Ttl, calling_method: &str) {
        self.record(calling_method, "set");
        self.safe.set(key, value, ttl).await;
    }

    /// JSON-typed convenience wrappers over `get`/`set`, for callers whose
    /// cached value is a structured result rather than opaque bytes
    /// (e.g. a decoded mirror-node block).
    pub async fn get_json<V: DeserializeOwned>(&self, key: &str, calling_method: &str) -> Option<V> {
        self.record(calling_method, "get");
        self.safe.get_json(key).await
    }

    pub async fn set_json<V: Serialize>(&self, key: &str, value: &V, ttl: Ttl, calling_method: &str) {
        self.record(calling_method, "set");
        self.safe.set_json(key, value, ttl).await;
    }

    pub async fn multi_set(&self, entries: Vec<(String, Vec<u8>)>, ttl: Ttl, calling_method: &str) {
        self.record(calling_method, "multiSet");
        self.safe.multi_set(entries, ttl).await;
    }

    pub async fn delete(&self, key: &str, calling_method: &str) {
        self.record(calling_method, "delete");
        self.safe.delete(key).await;
    }

    pub async fn clear(&self, calling_method: &str) {
        self.record(calling_method, "clear");
        self.safe.clear().await;
    }

    pub async fn incr_by(&self, key: &str, delta: i64, calling_method: &str) -> i64 {
        self.record(calling_method, "incrBy");
        self.safe.incr_by(key, delta).await
    }

    pub async fn r_push(&self, key: &str, value: Vec<u8>, calling_method: &str) -> usize {
        self.record(calling_method, "rPush");
        self.safe.r_push(key, value).await
    }

    pub async fn l_range(&self, key: &str, start: i64, end: i64, calling_method: &str) -> Vec<Vec<u8>> {
        self.record(calling_method, "lRange");
        self.safe.l_range(key, start, end).await
    }

    pub async fn keys(&self, pattern: &str, calling_method: &str) -> Vec<String> {
        self.record(calling_method, "keys");
        self.safe.keys(pattern).await
    }

    pub fn len(&self) -> usize {
        self.safe.len()
    }
}
