//! Errors the lock service can raise (spec §4.4).

#[derive(Debug, Clone, thiserror::Error)]
pub enum LockError {
    #[error("timed out waiting for lock on {0}")]
    WaitTimeout(String),
    #[error("lock backend unavailable: {0}")]
    BackendUnavailable(String),
}
