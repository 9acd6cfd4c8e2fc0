//! Redis-backed shared cache (spec §4.1 "Shared remote").
//!
//! Grounded on `other_examples`' web3-proxy `app.rs`, which keeps a
//! `redis::aio::MultiplexedConnection` alongside its local response cache
//! for the exact same role — a shared store reachable from every relay
//! instance. `redis::aio::ConnectionManager` is used here instead of a bare
//! multiplexed connection so a dropped connection is transparently
//! re-established (spec §6 `REDIS_RECONNECT_DELAY_MS`).

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::{
    error::CacheError,
    glob::glob_match,
    store::{CacheStore, Ttl},
};

const PREFIX: &str = "cache:";

fn prefixed(key: &str) -> String {
    format!("{PREFIX}{key}")
}

pub struct SharedCache {
    conn: ConnectionManager,
    multi_set_supported: bool,
}

impl SharedCache {
    pub async fn connect(redis_url: &str, multi_set_supported: bool) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::BackendUnavailable(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::BackendUnavailable(e.to_string()))?;
        Ok(Self { conn, multi_set_supported })
    }
}

#[async_trait]
impl CacheStore for SharedCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        conn.get(prefixed(key)).await.map_err(|e| CacheError::BackendUnavailable(e.to_string()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Ttl) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let key = prefixed(key);
        match ttl {
            Ttl::Indefinite => conn.set(&key, value).await,
            Ttl::Default => conn.set(&key, value).await,
            Ttl::For(d) => conn.set_ex(&key, value, d.as_secs().max(1)).await,
        }
        .map_err(|e| CacheError::BackendUnavailable(e.to_string()))
    }

    async fn multi_set(&self, entries: Vec<(String, Vec<u8>)>, ttl: Ttl) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        if self.multi_set_supported && matches!(ttl, Ttl::Default | Ttl::Indefinite) {
            let pairs: Vec<(String, Vec<u8>)> =
                entries.into_iter().map(|(k, v)| (prefixed(&k), v)).collect();
            conn.mset(&pairs).await.map_err(|e| CacheError::BackendUnavailable(e.to_string()))
        } else {
            // Pipeline with per-key TTL when MSET is unavailable or a
            // non-default TTL was requested (spec §4.1 `multiSet`).
            let mut pipe = redis::pipe();
            for (key, value) in entries {
                let key = prefixed(&key);
                match ttl {
                    Ttl::For(d) => {
                        pipe.set_ex(key, value, d.as_secs().max(1));
                    }
                    _ => {
                        pipe.set(key, value);
                    }
                }
            }
            pipe.query_async::<()>(&mut conn)
                .await
                .map_err(|e| CacheError::BackendUnavailable(e.to_string()))
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del(prefixed(key)).await.map_err(|e| CacheError::BackendUnavailable(e.to_string()))
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let keys = self.keys("*").await?;
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let full_keys: Vec<String> = keys.iter().map(|k| prefixed(k)).collect();
        conn.del(full_keys).await.map_err(|e| CacheError::BackendUnavailable(e.to_string()))
    }

    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, CacheError> {
        let mut conn = self.conn.clone();
        conn.incr(prefixed(key), delta).await.map_err(|e| CacheError::BackendUnavailable(e.to_string()))
    }

    async fn r_push(&self, key: &str, value: Vec<u8>) -> Result<usize, CacheError> {
        let mut conn = self.conn.clone();
        conn.rpush(prefixed(key), value)
            .await
            .map_err(|e| CacheError::BackendUnavailable(e.to_string()))
    }

    async fn l_range(&self, key: &str, start: i64, end: i64) -> Result<Vec<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        conn.lrange(prefixed(key), start as isize, end as isize)
            .await
            .map_err(|e| CacheError::BackendUnavailable(e.to_string()))
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn
            .keys(format!("{PREFIX}*"))
            .await
            .map_err(|e| CacheError::BackendUnavailable(e.to_string()))?;
        Ok(raw
            .into_iter()
            .filter_map(|k| k.strip_prefix(PREFIX).map(str::to_string))
            .filter(|k| glob_match(pattern, k))
            .collect())
    }

    fn len(&self) -> usize {
        // The shared backend doesn't keep a cheap local count; callers that
        // need size for metrics should prefer the local cache's `len()`.
        0
    }
}
