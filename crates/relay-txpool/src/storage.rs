//! The storage contract shared by the local and shared pending-transaction
//! backends (spec §4.3).

use async_trait::async_trait;

use crate::error::TxPoolError;

#[async_trait]
pub trait PendingTxStorage: Send + Sync {
    /// Atomically adds `rlp_hex` to `sender`'s set and the global set.
    async fn add(&self, sender: &str, rlp_hex: &str) -> Result<(), TxPoolError>;

    /// Atomically removes `rlp_hex` from both sets. The per-sender entry is
    /// dropped entirely once its set is empty.
    async fn remove(&self, sender: &str, rlp_hex: &str) -> Result<(), TxPoolError>;

    async fn count(&self, sender: &str) -> Result<usize, TxPoolError>;

    async fn payloads(&self, sender: &str) -> Result<Vec<String>, TxPoolError>;

    async fn all_payloads(&self) -> Result<Vec<String>, TxPoolError>;

    /// Deletes only the `txpool:pending:*` keys this storage owns (spec
    /// invariant I.1).
    async fn clear_all(&self) -> Result<(), TxPoolError>;
}
