//! Test-only fixtures shared across this crate's `#[cfg(test)]` modules:
//! an in-memory service bundle backed entirely by local implementations,
//! and a no-op consensus SDK stand-in.

#![cfg(test)]

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Bytes;
use async_trait::async_trait;
use relay_cache::RelayCache;
use relay_config::RelayConfig;
use relay_consensus::{
    ConsensusNodeSdk, ConsensusSubmissionClient, EthereumTransactionRequest, FileId, SdkClientError,
    SdkExecutionResult, SubsidisedRecipients,
};
use relay_hbar_limiter::HbarSpendingLimiter;
use relay_lock::{LocalLockManager, LockManager};
use relay_mirror::MirrorNodeClient;
use relay_txpool::{LocalPendingTxStorage, PendingTransactionPoolService};
use relay_workers::WorkerPool;

use crate::services::RelayServices;

pub struct NoopSdk;

#[async_trait]
impl ConsensusNodeSdk for NoopSdk {
    async fn current_gas_price_tinybars(&self) -> Result<u64, SdkClientError> {
        Ok(710_000_000)
    }

    async fn create_file(&self, _first_chunk: Bytes) -> Result<FileId, SdkClientError> {
        Ok(FileId(0, 0, 1234))
    }

    async fn append_file(&self, _file_id: FileId, _chunk: Bytes) -> Result<(), SdkClientError> {
        Ok(())
    }

    async fn execute_ethereum_transaction(
        &self,
        _request: EthereumTransactionRequest,
    ) -> Result<SdkExecutionResult, SdkClientError> {
        Ok(SdkExecutionResult {
            transaction_id: "0.0.1001@1700000000.000000001".to_string(),
            operator_id: "0.0.1001".to_string(),
            gas_used: Some(21_000),
        })
    }
}

pub fn test_services() -> Arc<RelayServices<NoopSdk>> {
    let config = RelayConfig::default();
    let cache = Arc::new(RelayCache::local(config.cache.cache_max as u32, config.cache.cache_ttl()));
    let mirror = Arc::new(MirrorNodeClient::new(config.mirror_node.clone(), cache.clone()).unwrap());
    let txpool = Arc::new(PendingTransactionPoolService::new(
        Arc::new(LocalPendingTxStorage::new()),
        config.enable_tx_pool,
    ));
    let hbar_limiter = Arc::new(HbarSpendingLimiter::new(u64::MAX, config.hbar_limiter.window()));
    let locks: Arc<dyn LockManager> =
        Arc::new(LocalLockManager::new(Duration::from_secs(30), Duration::from_secs(5)));
    let consensus = Arc::new(ConsensusSubmissionClient::new(
        Arc::new(NoopSdk),
        config.consensus.clone(),
        locks,
        txpool.clone(),
        hbar_limiter.clone(),
        SubsidisedRecipients::default(),
    ));
    let workers = Arc::new(WorkerPool::new(config.workers.workers_pool_max_threads));

    Arc::new(RelayServices::new(config, cache, mirror, txpool, hbar_limiter, consensus, workers))
}
