//! The uniform key/value/list/counter contract (spec §4.1).

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CacheError;

/// TTL policy for a write: `Default` lets the backend apply its own default
/// TTL, `Indefinite` corresponds to the spec's `ttl=0`, `For(duration)` sets
/// an explicit expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    Default,
    Indefinite,
    For(Duration),
}

impl Ttl {
    pub fn from_millis_option(ttl_ms: Option<u64>) -> Self {
        match ttl_ms {
            None => Self::Default,
            Some(0) => Self::Indefinite,
            Some(ms) => Self::For(Duration::from_millis(ms)),
        }
    }
}

/// Backend-agnostic key/value/list/counter store. Implemented by the local
/// LRU (§4.1 "Local LRU") and the Redis-backed shared store (§4.1 "Shared
/// remote"). Keys passed here are the *unprefixed* logical keys; prefixing
/// with `cache:` is the implementation's job so the prefix is never visible
/// to callers (spec invariant 1).
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Ttl) -> Result<(), CacheError>;

    /// Writes every entry with the same TTL. Backends that support a native
    /// multi-set use it; otherwise entries are pipelined one at a time
    /// (spec §4.1 "if remote supports MSET use it, else pipeline").
    async fn multi_set(&self, entries: Vec<(String, Vec<u8>)>, ttl: Ttl) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Deletes only keys under this store's prefix (spec invariant 1).
    async fn clear(&self) -> Result<(), CacheError>;

    /// Atomic increment; preserves the key's remaining TTL.
    async fn incr_by(&self, key: &str, delta: i64) -> Result<i64, CacheError>;

    async fn r_push(&self, key: &str, value: Vec<u8>) -> Result<usize, CacheError>;

    /// Inclusive range, negative indices count from the end (spec §8 "List
    /// round-trip").
    async fn l_range(&self, key: &str, start: i64, end: i64) -> Result<Vec<Vec<u8>>, CacheError>;

    /// Returns unprefixed keys matching the glob `pattern`.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError>;

    /// Current number of entries under management, for metrics collection.
    fn len(&self) -> usize;
}

/// Resolves an inclusive, possibly-negative `[start, end]` range against a
/// slice length the way Redis' `LRANGE` does.
pub(crate) fn resolve_range(len: usize, start: i64, end: i64) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len_i = len as i64;
    let norm = |idx: i64| -> i64 {
        if idx < 0 {
            (len_i + idx).max(0)
        } else {
            idx
        }
    };
    let start = norm(start).min(len_i - 1).max(0);
    let end = norm(end).min(len_i - 1);
    if end < start {
        None
    } else {
        Some((start as usize, end as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_range;

    #[test]
    fn negative_indices_count_from_end() {
        assert_eq!(resolve_range(5, -2, -1), Some((3, 4)));
        assert_eq!(resolve_range(5, 0, -1), Some((0, 4)));
    }

    #[test]
    fn empty_when_end_before_start() {
        assert_eq!(resolve_range(5, 4, 1), None);
    }
}
