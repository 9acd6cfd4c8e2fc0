//! In-process per-sender lock (spec §4.4 "Local").
//!
//! One entry per address; `acquire` waits cooperatively on a
//! [`tokio::sync::Notify`] until the holder releases (or its max-hold timer
//! fires) rather than spin-polling. State lives behind an `Arc` so the
//! max-hold timer task can hold its own handle instead of borrowing `self`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::sync::Notify;

use crate::error::LockError;
use crate::session;

struct Entry {
    holder: Option<String>,
    notify: Arc<Notify>,
}

type Entries = Arc<AsyncMutex<HashMap<String, Entry>>>;

pub struct LocalLockManager {
    entries: Entries,
    max_hold: Duration,
    wait_timeout: Duration,
}

impl LocalLockManager {
    pub fn new(max_hold: Duration, wait_timeout: Duration) -> Self {
        Self { entries: Arc::new(AsyncMutex::new(HashMap::new())), max_hold, wait_timeout }
    }

    /// Blocks until the lock on `address` is free or `wait_timeout`
    /// elapses, returning an opaque session key on success.
    pub async fn acquire(&self, address: &str) -> Result<String, LockError> {
        let address = address.to_lowercase();
        let deadline = tokio::time::Instant::now() + self.wait_timeout;

        loop {
            let notify = {
                let mut entries = self.entries.lock().await;
                let entry = entries
                    .entry(address.clone())
                    .or_insert_with(|| Entry { holder: None, notify: Arc::new(Notify::new()) });

                if entry.holder.is_none() {
                    let key = session::generate();
                    entry.holder = Some(key.clone());
                    self.spawn_max_hold_timer(address.clone(), key.clone());
                    return Ok(key);
                }
                entry.notify.clone()
            };

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(LockError::WaitTimeout(address));
            }
            if tokio::time::timeout(remaining, notify.notified()).await.is_err() {
                return Err(LockError::WaitTimeout(address));
            }
        }
    }

    /// No-op unless `session_key` matches the current holder (spec §4.4).
    pub async fn release(&self, address: &str, session_key: &str) {
        let address = address.to_lowercase();
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(&address) {
            if entry.holder.as_deref() == Some(session_key) {
                entry.holder = None;
                entry.notify.notify_waiters();
            }
        }
    }

    fn spawn_max_hold_timer(&self, address: String, session_key: String) {
        if self.max_hold.is_zero() {
            return;
        }
        let max_hold = self.max_hold;
        let entries = self.entries.clone();
        tokio::spawn(async move {
            tokio::time::sleep(max_hold).await;
            let mut entries = entries.lock().await;
            if let Some(entry) = entries.get_mut(&address) {
                if entry.holder.as_deref() == Some(session_key.as_str()) {
                    tracing::warn!(address = %address, "lock max-hold exceeded, auto-releasing");
                    entry.holder = None;
                    entry.notify.notify_waiters();
                }
            }
        });
    }
}

impl Default for LocalLockManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(30), Duration::from_secs(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_blocks_until_release() {
        let manager = Arc::new(LocalLockManager::new(Duration::from_secs(60), Duration::from_secs(5)));
        let key = manager.acquire("0xabc").await.unwrap();

        let waiter = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.acquire("0xabc").await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        manager.release("0xabc", &key).await;

        let second_key = waiter.await.unwrap().unwrap();
        assert_ne!(second_key, key);
    }

    #[tokio::test]
    async fn release_with_wrong_key_is_a_no_op() {
        let manager = LocalLockManager::new(Duration::from_secs(60), Duration::from_secs(5));
        let key = manager.acquire("0xabc").await.unwrap();

        manager.release("0xabc", "not-the-key").await;

        let result = tokio::time::timeout(Duration::from_millis(100), manager.acquire("0xabc")).await;
        assert!(result.is_err() || result.unwrap().is_err());
        let _ = key;
    }

    #[tokio::test]
    async fn acquire_times_out_when_lock_held_past_wait_timeout() {
        let manager = LocalLockManager::new(Duration::from_secs(60), Duration::from_millis(50));
        let _key = manager.acquire("0xabc").await.unwrap();

        let result = manager.acquire("0xabc").await;
        assert!(matches!(result, Err(LockError::WaitTimeout(_))));
    }

    #[tokio::test]
    async fn max_hold_timer_auto_releases_lock() {
        let manager = LocalLockManager::new(Duration::from_millis(30), Duration::from_secs(5));
        let _key = manager.acquire("0xabc").await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = manager.acquire("0xabc").await;
        assert!(second.is_ok());
    }
}
