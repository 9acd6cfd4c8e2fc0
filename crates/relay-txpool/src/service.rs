//! The pending-transaction pool service (spec §4.3 "Pool service").
//!
//! Thin façade over a [`PendingTxStorage`]; never parses RLP itself —
//! regrouping into `{pending, queued}` by nonce is the dispatch layer's
//! job (see `relay-rpc`'s `txpool` namespace).

use std::sync::Arc;

use relay_metrics::record_eth_execution;

use crate::error::TxPoolError;
use crate::storage::PendingTxStorage;

pub struct PendingTransactionPoolService {
    storage: Arc<dyn PendingTxStorage>,
    enabled: bool,
}

impl PendingTransactionPoolService {
    pub fn new(storage: Arc<dyn PendingTxStorage>, enabled: bool) -> Self {
        Self { storage, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn save_transaction(&self, address: &str, rlp_hex: &str) -> Result<(), TxPoolError> {
        if !self.enabled {
            return Err(TxPoolError::Disabled);
        }
        let result = self.storage.add(&address.to_lowercase(), rlp_hex).await;
        record_eth_execution("txpool_save", if result.is_ok() { "success" } else { "failure" });
        result
    }

    pub async fn remove_transaction(&self, address: &str, rlp_hex: &str) -> Result<(), TxPoolError> {
        if !self.enabled {
            return Err(TxPoolError::Disabled);
        }
        self.storage.remove(&address.to_lowercase(), rlp_hex).await
    }

    pub async fn get_pending_count(&self, address: &str) -> Result<usize, TxPoolError> {
        self.storage.count(&address.to_lowercase()).await
    }

    pub async fn get_transactions(&self, address: &str) -> Result<Vec<String>, TxPoolError> {
        self.storage.payloads(&address.to_lowercase()).await
    }

    pub async fn get_all_transactions(&self) -> Result<Vec<String>, TxPoolError> {
        self.storage.all_payloads().await
    }

    /// Clears pending state under the storage's own prefix only (spec
    /// invariant I.1, applied at startup reset).
    pub async fn reset(&self) -> Result<(), TxPoolError> {
        self.storage.clear_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalPendingTxStorage;

    fn service() -> PendingTransactionPoolService {
        PendingTransactionPoolService::new(Arc::new(LocalPendingTxStorage::new()), true)
    }

    #[tokio::test]
    async fn save_normalises_address_case() {
        let svc = service();
        svc.save_transaction("0xABCdef", "0x01").await.unwrap();

        assert_eq!(svc.get_pending_count("0xabcdef").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn disabled_service_rejects_writes() {
        let svc = PendingTransactionPoolService::new(Arc::new(LocalPendingTxStorage::new()), false);
        let result = svc.save_transaction("0xabc", "0x01").await;

        assert!(matches!(result, Err(TxPoolError::Disabled)));
    }
}
