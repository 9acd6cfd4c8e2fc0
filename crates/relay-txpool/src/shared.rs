//! Redis-backed pending-transaction storage (spec §4.3 "shared remote").
//!
//! `add`/`remove` run as a single pipelined multi-op so a connection drop
//! mid-write cannot leave the per-sender set and the global set out of
//! sync (spec "Atomicity" — remote backend).

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::TxPoolError;
use crate::storage::PendingTxStorage;

const GLOBAL_KEY: &str = "txpool:pending:global";
const CLEAR_PATTERN: &str = "txpool:pending:*";

fn sender_key(sender: &str) -> String {
    format!("txpool:pending:{}", sender.to_lowercase())
}

pub struct SharedPendingTxStorage {
    conn: ConnectionManager,
    ttl_secs: u64,
}

impl SharedPendingTxStorage {
    pub async fn connect(redis_url: &str, ttl_secs: u64) -> Result<Self, TxPoolError> {
        let client =
            redis::Client::open(redis_url).map_err(|e| TxPoolError::BackendUnavailable(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| TxPoolError::BackendUnavailable(e.to_string()))?;
        Ok(Self { conn, ttl_secs })
    }
}

#[async_trait]
impl PendingTxStorage for SharedPendingTxStorage {
    async fn add(&self, sender: &str, rlp_hex: &str) -> Result<(), TxPoolError> {
        let mut conn = self.conn.clone();
        let key = sender_key(sender);
        let mut pipe = redis::pipe();
        pipe.atomic()
            .sadd(&key, rlp_hex)
            .ignore()
            .sadd(GLOBAL_KEY, rlp_hex)
            .ignore();
        if self.ttl_secs > 0 {
            pipe.expire(&key, self.ttl_secs as i64).ignore();
        }
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(|e| TxPoolError::BackendUnavailable(e.to_string()))
    }

    async fn remove(&self, sender: &str, rlp_hex: &str) -> Result<(), TxPoolError> {
        let mut conn = self.conn.clone();
        let key = sender_key(sender);
        redis::pipe()
            .atomic()
            .srem(&key, rlp_hex)
            .ignore()
            .srem(GLOBAL_KEY, rlp_hex)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| TxPoolError::BackendUnavailable(e.to_string()))
    }

    async fn count(&self, sender: &str) -> Result<usize, TxPoolError> {
        let mut conn = self.conn.clone();
        conn.scard(sender_key(sender))
            .await
            .map_err(|e| TxPoolError::BackendUnavailable(e.to_string()))
    }

    async fn payloads(&self, sender: &str) -> Result<Vec<String>, TxPoolError> {
        let mut conn = self.conn.clone();
        conn.smembers(sender_key(sender))
            .await
            .map_err(|e| TxPoolError::BackendUnavailable(e.to_string()))
    }

    async fn all_payloads(&self) -> Result<Vec<String>, TxPoolError> {
        let mut conn = self.conn.clone();
        conn.smembers(GLOBAL_KEY).await.map_err(|e| TxPoolError::BackendUnavailable(e.to_string()))
    }

    async fn clear_all(&self) -> Result<(), TxPoolError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn
            .keys(CLEAR_PATTERN)
            .await
            .map_err(|e| TxPoolError::BackendUnavailable(e.to_string()))?;
        if keys.is_empty() {
            return Ok(());
        }
        conn.del::<_, ()>(keys).await.map_err(|e| TxPoolError::BackendUnavailable(e.to_string()))
    }
}
