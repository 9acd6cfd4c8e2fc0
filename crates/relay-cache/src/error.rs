//! Cache error taxonomy (spec §7: `REDIS_UNAVAILABLE`).

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("local cache type mismatch for key {key}: expected {expected}")]
    TypeMismatch { key: String, expected: &'static str },
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
