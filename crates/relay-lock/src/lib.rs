//! Write-serialization lock service (spec §4.4 `C4`): local per-sender
//! mutex and distributed Redis variant, sharing the same session-key
//! release invariant.

pub mod distributed;
pub mod error;
pub mod local;
pub mod session;

use async_trait::async_trait;

pub use distributed::DistributedLockManager;
pub use error::LockError;
pub use local::LocalLockManager;

/// The contract both lock backends satisfy, so callers (the raw-transaction
/// submission path in particular) can hold either behind one `Arc<dyn
/// LockManager>` without caring which is configured (spec §4.4: "Two
/// strategies", same session-key invariant for both).
#[async_trait]
pub trait LockManager: Send + Sync {
    async fn acquire(&self, address: &str) -> Result<String, LockError>;

    async fn release(&self, address: &str, session_key: &str) -> Result<(), LockError>;
}

#[async_trait]
impl LockManager for LocalLockManager {
    async fn acquire(&self, address: &str) -> Result<String, LockError> {
        LocalLockManager::acquire(self, address).await
    }

    async fn release(&self, address: &str, session_key: &str) -> Result<(), LockError> {
        LocalLockManager::release(self, address, session_key).await;
        Ok(())
    }
}

#[async_trait]
impl LockManager for DistributedLockManager {
    async fn acquire(&self, address: &str) -> Result<String, LockError> {
        DistributedLockManager::acquire(self, address).await
    }

    async fn release(&self, address: &str, session_key: &str) -> Result<(), LockError> {
        DistributedLockManager::release(self, address, session_key).await
    }
}
