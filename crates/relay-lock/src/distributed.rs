//! Redis-backed distributed lock (spec §4.4 "Distributed").
//!
//! `acquire` is `SET key value NX PX max_hold_ms`, polled until it succeeds
//! or `wait_timeout` elapses — Redis' own key expiry is the max-hold timer,
//! so no separate client-side timer task is needed here (unlike the local
//! manager, which has no backend to expire the entry for it). `release` is
//! a Lua compare-and-delete so a session key never removes a lock some
//! other holder has since acquired.

use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::LockError;
use crate::session;

const RELEASE_SCRIPT: &str = r#"
if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("del", KEYS[1])
else
    return 0
end
"#;

fn lock_key(address: &str) -> String {
    format!("lock:{}", address.to_lowercase())
}

pub struct DistributedLockManager {
    conn: ConnectionManager,
    max_hold: Duration,
    wait_timeout: Duration,
    poll_interval: Duration,
}

impl DistributedLockManager {
    pub fn new(conn: ConnectionManager, max_hold: Duration, wait_timeout: Duration) -> Self {
        Self { conn, max_hold, wait_timeout, poll_interval: Duration::from_millis(50) }
    }

    pub async fn acquire(&self, address: &str) -> Result<String, LockError> {
        let key = lock_key(address);
        let session_key = session::generate();
        let deadline = tokio::time::Instant::now() + self.wait_timeout;

        loop {
            let mut conn = self.conn.clone();
            let acquired: bool = redis::cmd("SET")
                .arg(&key)
                .arg(&session_key)
                .arg("NX")
                .arg("PX")
                .arg(self.max_hold.as_millis() as u64)
                .query_async::<Option<String>>(&mut conn)
                .await
                .map(|r| r.is_some())
                .map_err(|e| LockError::BackendUnavailable(e.to_string()))?;

            if acquired {
                return Ok(session_key);
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(LockError::WaitTimeout(address.to_string()));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    pub async fn release(&self, address: &str, session_key: &str) -> Result<(), LockError> {
        let mut conn = self.conn.clone();
        redis::Script::new(RELEASE_SCRIPT)
            .key(lock_key(address))
            .arg(session_key)
            .invoke_async::<i64>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| LockError::BackendUnavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_key_is_lowercased_and_prefixed() {
        assert_eq!(lock_key("0xABC"), "lock:0xabc");
    }
}
