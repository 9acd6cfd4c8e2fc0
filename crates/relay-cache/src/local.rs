//! Bounded local LRU cache and the never-evicted reserved-key store
//! (spec §4.1 "Local LRU").
//!
//! Grounded on `reth-rpc-eth-types`'s bounded, `schnellru`-backed caches
//! (`EthStateCache` et al.): a fixed-capacity map guarded by a single mutex,
//! values read back with a lazy expiry check rather than a background
//! sweeper, with an explicit `purge_expired` hook metrics collection calls.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use schnellru::{ByLength, LruMap};

use crate::{
    error::CacheError,
    glob::glob_match,
    store::{resolve_range, CacheStore, Ttl},
};

#[derive(Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }

    fn remaining_ttl(&self) -> Option<Duration> {
        self.expires_at.map(|at| at.saturating_duration_since(Instant::now()))
    }
}

#[derive(Clone)]
enum Value {
    Bytes(Vec<u8>),
    List(Vec<Vec<u8>>),
    Counter(i64),
}

impl Value {
    fn as_bytes(&self) -> Result<Vec<u8>, CacheError> {
        match self {
            Self::Bytes(b) => Ok(b.clone()),
            Self::Counter(n) => Ok(n.to_string().into_bytes()),
            Self::List(_) => Err(CacheError::TypeMismatch {
                key: String::new(),
                expected: "scalar",
            }),
        }
    }
}

fn ttl_to_expiry(ttl: Ttl, default_ttl: Duration) -> Option<Instant> {
    match ttl {
        Ttl::Indefinite => None,
        Ttl::Default if default_ttl.is_zero() => None,
        Ttl::Default => Some(Instant::now() + default_ttl),
        Ttl::For(d) => Some(Instant::now() + d),
    }
}

/// Bounded-by-count local cache. TTL per entry overridable at write time;
/// entries past their expiry are treated as absent on read and dropped.
pub struct LocalLruCache {
    entries: Mutex<LruMap<String, Entry, ByLength>>,
    default_ttl: Duration,
}

impl LocalLruCache {
    pub fn new(max_entries: u32, default_ttl: Duration) -> Self {
        Self { entries: Mutex::new(LruMap::new(ByLength::new(max_entries))), default_ttl }
    }

    /// Drops expired entries; called from the metrics collection path
    /// (spec §4.1 "Eviction/TTL policy").
    pub fn purge_expired(&self) {
        let mut guard = self.entries.lock();
        let expired: Vec<String> = guard
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(k, _)| k.clone())
            .collect();
        for key in expired {
            guard.remove(&key);
        }
    }
}

#[async_trait]
impl CacheStore for LocalLruCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut guard = self.entries.lock();
        match guard.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.as_bytes()).transpose(),
            Some(_) => {
                guard.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Ttl) -> Result<(), CacheError> {
        let expires_at = ttl_to_expiry(ttl, self.default_ttl);
        self.entries.lock().insert(key.to_string(), Entry { value: Value::Bytes(value), expires_at });
        Ok(())
    }

    async fn multi_set(&self, entries: Vec<(String, Vec<u8>)>, ttl: Ttl) -> Result<(), CacheError> {
        for (key, value) in entries {
            self.set(&key, value, ttl).await?;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.lock().clear();
        Ok(())
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, CacheError> {
        let mut guard = self.entries.lock();
        let (current, expires_at) = match guard.get(key) {
            Some(entry) if !entry.is_expired() => {
                let current = match &entry.value {
                    Value::Counter(n) => *n,
                    Value::Bytes(b) => std::str::from_utf8(b)
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(0),
                    Value::List(_) => {
                        return Err(CacheError::TypeMismatch { key: key.to_string(), expected: "counter" })
                    }
                };
                (current, entry.remaining_ttl())
            }
            _ => (0, None),
        };
        let updated = current + delta;
        guard.insert(
            key.to_string(),
            Entry { value: Value::Counter(updated), expires_at: expires_at.map(|d| Instant::now() + d) },
        );
        Ok(updated)
    }

    async fn r_push(&self, key: &str, value: Vec<u8>) -> Result<usize, CacheError> {
        let mut guard = self.entries.lock();
        let (mut list, expires_at) = match guard.get(key) {
            Some(entry) if !entry.is_expired() => {
                let list = match &entry.value {
                    Value::List(items) => items.clone(),
                    _ => {
                        return Err(CacheError::TypeMismatch { key: key.to_string(), expected: "list" })
                    }
                };
                (list, entry.remaining_ttl())
            }
            _ => (Vec::new(), None),
        };
        list.push(value);
        let len = list.len();
        guard.insert(
            key.to_string(),
            Entry { value: Value::List(list), expires_at: expires_at.map(|d| Instant::now() + d) },
        );
        Ok(len)
    }

    async fn l_range(&self, key: &str, start: i64, end: i64) -> Result<Vec<Vec<u8>>, CacheError> {
        let mut guard = self.entries.lock();
        let Some(entry) = guard.get(key) else { return Ok(Vec::new()) };
        if entry.is_expired() {
            guard.remove(key);
            return Ok(Vec::new());
        }
        let list = match &entry.value {
            Value::List(items) => items,
            _ => return Err(CacheError::TypeMismatch { key: key.to_string(), expected: "list" }),
        };
        Ok(match resolve_range(list.len(), start, end) {
            Some((s, e)) => list[s..=e].to_vec(),
            None => Vec::new(),
        })
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let mut guard = self.entries.lock();
        let expired: Vec<String> =
            guard.iter().filter(|(_, e)| e.is_expired()).map(|(k, _)| k.clone()).collect();
        for key in &expired {
            guard.remove(key);
        }
        Ok(guard.iter().map(|(k, _)| k.clone()).filter(|k| glob_match(pattern, k)).collect())
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

/// Small, never-evicted store for reserved keys (spec §3 `ReservedKey`).
/// Unlike [`LocalLruCache`] it is not bounded by count — reserved keys are
/// a handful of well-known names, not request-driven, so there is nothing
/// to evict under memory pressure.
pub struct ReservedCache {
    entries: Mutex<std::collections::HashMap<String, Entry>>,
}

impl Default for ReservedCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservedCache {
    pub fn new() -> Self {
        Self { entries: Mutex::new(std::collections::HashMap::new()) }
    }
}

#[async_trait]
impl CacheStore for ReservedCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut guard = self.entries.lock();
        match guard.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.as_bytes()).transpose(),
            Some(_) => {
                guard.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Ttl) -> Result<(), CacheError> {
        let expires_at = ttl_to_expiry(ttl, Duration::ZERO);
        self.entries.lock().insert(key.to_string(), Entry { value: Value::Bytes(value), expires_at });
        Ok(())
    }

    async fn multi_set(&self, entries: Vec<(String, Vec<u8>)>, ttl: Ttl) -> Result<(), CacheError> {
        for (key, value) in entries {
            self.set(&key, value, ttl).await?;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.lock().clear();
        Ok(())
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, CacheError> {
        let mut guard = self.entries.lock();
        let current = guard.get(key).map_or(0, |e| match &e.value {
            Value::Counter(n) => *n,
            _ => 0,
        });
        let updated = current + delta;
        guard.insert(key.to_string(), Entry { value: Value::Counter(updated), expires_at: None });
        Ok(updated)
    }

    async fn r_push(&self, key: &str, value: Vec<u8>) -> Result<usize, CacheError> {
        let mut guard = self.entries.lock();
        let mut list = guard.get(key).map_or(Vec::new(), |e| match &e.value {
            Value::List(items) => items.clone(),
            _ => Vec::new(),
        });
        list.push(value);
        let len = list.len();
        guard.insert(key.to_string(), Entry { value: Value::List(list), expires_at: None });
        Ok(len)
    }

    async fn l_range(&self, key: &str, start: i64, end: i64) -> Result<Vec<Vec<u8>>, CacheError> {
        let guard = self.entries.lock();
        let Some(entry) = guard.get(key) else { return Ok(Vec::new()) };
        let list = match &entry.value {
            Value::List(items) => items,
            _ => return Ok(Vec::new()),
        };
        Ok(match resolve_range(list.len(), start, end) {
            Some((s, e)) => list[s..=e].to_vec(),
            None => Vec::new(),
        })
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let guard = self.entries.lock();
        Ok(guard.keys().filter(|k| glob_match(pattern, k)).cloned().collect())
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clear_only_removes_local_entries_not_reserved() {
        let local = LocalLruCache::new(100, Duration::from_secs(60));
        local.set("a", b"1".to_vec(), Ttl::Default).await.unwrap();
        local.clear().await.unwrap();
        assert_eq!(local.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn ttl_zero_is_indefinite() {
        let local = LocalLruCache::new(100, Duration::from_millis(1));
        local.set("a", b"1".to_vec(), Ttl::Indefinite).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(local.get("a").await.unwrap(), Some(b"1".to_vec()));
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let local = LocalLruCache::new(100, Duration::from_secs(60));
        local.set("a", b"1".to_vec(), Ttl::For(Duration::from_millis(1))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(local.get("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_round_trip_preserves_order() {
        let local = LocalLruCache::new(100, Duration::from_secs(60));
        local.r_push("l", b"v1".to_vec()).await.unwrap();
        local.r_push("l", b"v2".to_vec()).await.unwrap();
        let all = local.l_range("l", 0, -1).await.unwrap();
        assert_eq!(all, vec![b"v1".to_vec(), b"v2".to_vec()]);
        let last_two = local.l_range("l", -2, -1).await.unwrap();
        assert_eq!(last_two, vec![b"v1".to_vec(), b"v2".to_vec()]);
    }

    #[tokio::test]
    async fn reserved_keys_survive_size_pressure() {
        let reserved = ReservedCache::new();
        for i in 0..10_000 {
            reserved.set(&format!("k{i}"), b"v".to_vec(), Ttl::Indefinite).await.unwrap();
        }
        assert_eq!(reserved.get("k0").await.unwrap(), Some(b"v".to_vec()));
    }
}
