//! The raw-transaction submission path (spec §4.6 `C6`, and the write flow
//! traced in spec §2: C4 acquires the sender lock, C3 records the pending
//! entry, C5 pre-checks spend, this module submits, then emits events and
//! releases the lock).

use std::sync::Arc;

use relay_config::ConsensusConfig;
use relay_hbar_limiter::{HbarSpendingLimiter, RequestMode};
use relay_lock::LockManager;
use relay_metrics::record_eth_execution;
use relay_primitives::context::RequestContext;
use relay_primitives::events::{EventRecord, ExecuteTransactionEvent};
use relay_txpool::PendingTransactionPoolService;

use crate::decode::decode_raw_transaction;
use crate::error::{RawTransactionError, SdkClientError};
use crate::fees::max_transaction_fee_tinybars;
use crate::file_chunking::split_into_chunks;
use crate::sdk::{ConsensusNodeSdk, EthereumTransactionRequest, SubsidisedRecipients};

pub struct ConsensusSubmissionClient<S> {
    sdk: Arc<S>,
    config: ConsensusConfig,
    locks: Arc<dyn LockManager>,
    pool: Arc<PendingTransactionPoolService>,
    hbar_limiter: Arc<HbarSpendingLimiter>,
    subsidised: SubsidisedRecipients,
}

impl<S: ConsensusNodeSdk> ConsensusSubmissionClient<S> {
    pub fn new(
        sdk: Arc<S>,
        config: ConsensusConfig,
        locks: Arc<dyn LockManager>,
        pool: Arc<PendingTransactionPoolService>,
        hbar_limiter: Arc<HbarSpendingLimiter>,
        subsidised: SubsidisedRecipients,
    ) -> Self {
        Self { sdk, config, locks, pool, hbar_limiter, subsidised }
    }

    /// Submits a raw, pre-signed Ethereum transaction through the
    /// consensus SDK, serialized per-sender (spec §4.6, §5 "Ordering
    /// guarantees").
    pub async fn submit_raw_transaction(
        &self,
        rlp_hex: &str,
        ctx: &RequestContext,
    ) -> Result<EventRecord, RawTransactionError> {
        let decoded = decode_raw_transaction(rlp_hex)?;
        let sender = format!("{:#x}", decoded.sender);

        let session_key = self.locks.acquire(&sender).await?;

        // Everything from here on must release the lock on the way out,
        // success or failure (spec §4.6 step 6, "finally path").
        let outcome = self.submit_locked(rlp_hex, &decoded, &sender, ctx).await;

        let release_result = self.locks.release(&sender, &session_key).await;
        if let Err(err) = release_result {
            tracing::warn!(sender = %sender, error = %err, "failed to release sender lock");
        }

        outcome
    }

    async fn submit_locked(
        &self,
        rlp_hex: &str,
        decoded: &crate::decode::DecodedRawTransaction,
        sender: &str,
        ctx: &RequestContext,
    ) -> Result<EventRecord, RawTransactionError> {
        if self.pool.is_enabled() {
            self.pool.save_transaction(sender, rlp_hex).await?;
        }

        if self.hbar_limiter.should_limit(
            RequestMode::Transaction,
            Some(sender),
            "eth_sendRawTransaction",
            None,
            ctx,
            None,
        ) {
            if self.pool.is_enabled() {
                let _ = self.pool.remove_transaction(sender, rlp_hex).await;
            }
            return Err(RawTransactionError::HbarRateLimitExceeded);
        }

        let request = match self.package_transaction(decoded, rlp_hex).await {
            Ok(request) => request,
            Err(err) => {
                if self.pool.is_enabled() {
                    let _ = self.pool.remove_transaction(sender, rlp_hex).await;
                }
                return Err(err.into());
            }
        };

        let result = self.sdk.execute_ethereum_transaction(request).await;

        if self.pool.is_enabled() {
            let _ = self.pool.remove_transaction(sender, rlp_hex).await;
        }

        match result {
            Ok(execution) => {
                record_eth_execution("eth_sendRawTransaction", "success");
                Ok(EventRecord::ExecuteTransaction(ExecuteTransactionEvent {
                    transaction_id: execution.transaction_id,
                    tx_kind: "eth_sendRawTransaction".to_string(),
                    operator_id: execution.operator_id,
                    original_caller: sender.to_string(),
                    gas_used: execution.gas_used,
                    ctx: ctx.clone(),
                }))
            }
            Err(err) if err.is_wrong_nonce() => {
                // Rethrown immediately, never retried (spec §4.6 step 6).
                record_eth_execution("eth_sendRawTransaction", "failure");
                Err(RawTransactionError::Sdk(err))
            }
            Err(err) => {
                record_eth_execution("eth_sendRawTransaction", "failure");
                Err(RawTransactionError::Sdk(err))
            }
        }
    }

    /// Decides inline-vs-file-chunked call data, computes `maxTransactionFee`
    /// and the optional subsidised gas allowance (spec §4.6 steps 2-5).
    async fn package_transaction(
        &self,
        decoded: &crate::decode::DecodedRawTransaction,
        rlp_hex: &str,
    ) -> Result<EthereumTransactionRequest, SdkClientError> {
        let raw_rlp = alloy_primitives::Bytes::from(
            alloy_primitives::hex::decode(rlp_hex.strip_prefix("0x").unwrap_or(rlp_hex))
                .map_err(|e| SdkClientError::new("INVALID_TRANSACTION", e.to_string()))?,
        );

        let (call_data, call_data_file_id) = if decoded.call_data.len() <= self.config.file_append_chunk_size
            || self.config.jumbo_tx_enabled
        {
            (Some(decoded.call_data.clone()), None)
        } else {
            let chunked = split_into_chunks(
                &decoded.call_data,
                self.config.file_append_chunk_size,
                self.config.file_append_max_chunks,
            )
            .ok_or_else(|| {
                SdkClientError::new(
                    "CALL_DATA_TOO_LARGE",
                    format!(
                        "call data of {} bytes exceeds {} chunks of {} bytes",
                        decoded.call_data.len(),
                        self.config.file_append_max_chunks,
                        self.config.file_append_chunk_size
                    ),
                )
            })?;

            let file_id = self.sdk.create_file(chunked.first).await?;
            for chunk in chunked.rest {
                self.sdk.append_file(file_id, chunk).await?;
            }
            (None, Some(file_id))
        };

        let gas_price = self.sdk.current_gas_price_tinybars().await?;
        let max_transaction_fee_tinybars = max_transaction_fee_tinybars(gas_price);

        let max_gas_allowance_tinybars = decoded
            .recipient
            .filter(|to| self.subsidised.contains(to))
            .map(|_| (self.config.max_gas_allowance_hbar.max(0) as u64) * 100_000_000);

        Ok(EthereumTransactionRequest {
            raw_rlp,
            call_data,
            call_data_file_id,
            max_transaction_fee_tinybars,
            max_gas_allowance_tinybars,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    use alloy_consensus::{SignableTransaction, TxEip1559, TxEnvelope};
    use alloy_primitives::{Address, Bytes, Signature, TxKind, U256};
    use async_trait::async_trait;
    use relay_lock::LocalLockManager;
    use relay_txpool::{LocalPendingTxStorage, PendingTransactionPoolService};

    use super::*;
    use crate::sdk::{FileId, SdkExecutionResult};

    struct FakeSdk {
        gas_price: u64,
        created_files: Mutex<Vec<Bytes>>,
        appended: Mutex<Vec<Bytes>>,
        executions: AtomicU64,
        fail_with_wrong_nonce: bool,
    }

    #[async_trait]
    impl ConsensusNodeSdk for FakeSdk {
        async fn current_gas_price_tinybars(&self) -> Result<u64, SdkClientError> {
            Ok(self.gas_price)
        }

        async fn create_file(&self, first_chunk: Bytes) -> Result<FileId, SdkClientError> {
            self.created_files.lock().unwrap().push(first_chunk);
            Ok(FileId(0, 0, 1))
        }

        async fn append_file(&self, _file_id: FileId, chunk: Bytes) -> Result<(), SdkClientError> {
            self.appended.lock().unwrap().push(chunk);
            Ok(())
        }

        async fn execute_ethereum_transaction(
            &self,
            _request: EthereumTransactionRequest,
        ) -> Result<SdkExecutionResult, SdkClientError> {
            self.executions.fetch_add(1, Ordering::SeqCst);
            if self.fail_with_wrong_nonce {
                return Err(SdkClientError::new("WRONG_NONCE", "nonce too low"));
            }
            Ok(SdkExecutionResult {
                transaction_id: "0.0.1001@1700000000.000000001".to_string(),
                operator_id: "0.0.1001".to_string(),
                gas_used: Some(21_000),
            })
        }
    }

    fn signed_raw_tx(input_len: usize) -> String {
        let tx = TxEip1559 {
            chain_id: 296,
            nonce: 0,
            gas_limit: 100_000,
            max_fee_per_gas: 1_000_000_000,
            max_priority_fee_per_gas: 1_000_000_000,
            to: TxKind::Call(Address::repeat_byte(0xAB)),
            value: U256::ZERO,
            input: Bytes::from(vec![0x11; input_len]),
            access_list: Default::default(),
        };
        // `Signature::test_signature()` is the fixture alloy/reth tests use
        // for a well-formed (not necessarily tx-matching) signature; this
        // harness only needs `recover_signer` to succeed, not to recover a
        // particular address.
        let signed = tx.into_signed(Signature::test_signature());
        let envelope = TxEnvelope::Eip1559(signed);
        format!("0x{}", alloy_primitives::hex::encode(alloy_eips::eip2718::Encodable2718::encoded_2718(&envelope)))
    }

    fn test_config() -> ConsensusConfig {
        let mut cfg = ConsensusConfig::default();
        cfg.file_append_chunk_size = 4096;
        cfg.file_append_max_chunks = 20;
        cfg.jumbo_tx_enabled = false;
        cfg
    }

    #[tokio::test]
    async fn small_call_data_submits_inline_and_clears_pending_count() {
        let sdk = Arc::new(FakeSdk {
            gas_price: 100,
            created_files: Mutex::new(Vec::new()),
            appended: Mutex::new(Vec::new()),
            executions: AtomicU64::new(0),
            fail_with_wrong_nonce: false,
        });
        let locks: Arc<dyn LockManager> =
            Arc::new(LocalLockManager::new(std::time::Duration::from_secs(30), std::time::Duration::from_secs(5)));
        let pool = Arc::new(PendingTransactionPoolService::new(Arc::new(LocalPendingTxStorage::new()), true));
        let hbar_limiter = Arc::new(HbarSpendingLimiter::new(u64::MAX, std::time::Duration::from_secs(60)));

        let client = ConsensusSubmissionClient::new(
            sdk.clone(),
            test_config(),
            locks,
            pool.clone(),
            hbar_limiter,
            SubsidisedRecipients::default(),
        );

        let rlp_hex = signed_raw_tx(60);
        let ctx = RequestContext::new("req-1", "127.0.0.1");
        let event = client.submit_raw_transaction(&rlp_hex, &ctx).await.unwrap();

        assert!(matches!(event, EventRecord::ExecuteTransaction(_)));
        assert_eq!(sdk.created_files.lock().unwrap().len(), 0);
        assert_eq!(sdk.executions.load(Ordering::SeqCst), 1);
        assert_eq!(pool.get_all_transactions().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn oversized_call_data_creates_a_file_before_executing() {
        let sdk = Arc::new(FakeSdk {
            gas_price: 50,
            created_files: Mutex::new(Vec::new()),
            appended: Mutex::new(Vec::new()),
            executions: AtomicU64::new(0),
            fail_with_wrong_nonce: false,
        });
        let locks: Arc<dyn LockManager> =
            Arc::new(LocalLockManager::new(std::time::Duration::from_secs(30), std::time::Duration::from_secs(5)));
        let pool = Arc::new(PendingTransactionPoolService::new(Arc::new(LocalPendingTxStorage::new()), true));
        let hbar_limiter = Arc::new(HbarSpendingLimiter::new(u64::MAX, std::time::Duration::from_secs(60)));

        let client = ConsensusSubmissionClient::new(
            sdk.clone(),
            test_config(),
            locks,
            pool,
            hbar_limiter,
            SubsidisedRecipients::default(),
        );

        let rlp_hex = signed_raw_tx(10_000);
        let ctx = RequestContext::new("req-1", "127.0.0.1");
        client.submit_raw_transaction(&rlp_hex, &ctx).await.unwrap();

        assert_eq!(sdk.created_files.lock().unwrap().len(), 1);
        assert_eq!(sdk.created_files.lock().unwrap()[0].len(), 4096);
        assert!(!sdk.appended.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_nonce_is_rethrown_and_lock_is_still_released() {
        let sdk = Arc::new(FakeSdk {
            gas_price: 10,
            created_files: Mutex::new(Vec::new()),
            appended: Mutex::new(Vec::new()),
            executions: AtomicU64::new(0),
            fail_with_wrong_nonce: true,
        });
        let locks = Arc::new(LocalLockManager::new(
            std::time::Duration::from_secs(30),
            std::time::Duration::from_secs(1),
        ));
        let pool = Arc::new(PendingTransactionPoolService::new(Arc::new(LocalPendingTxStorage::new()), true));
        let hbar_limiter = Arc::new(HbarSpendingLimiter::new(u64::MAX, std::time::Duration::from_secs(60)));

        let client = ConsensusSubmissionClient::new(
            sdk,
            test_config(),
            locks.clone(),
            pool,
            hbar_limiter,
            SubsidisedRecipients::default(),
        );

        let rlp_hex = signed_raw_tx(60);
        let ctx = RequestContext::new("req-1", "127.0.0.1");
        let result = client.submit_raw_transaction(&rlp_hex, &ctx).await;
        assert!(matches!(result, Err(RawTransactionError::Sdk(e)) if e.is_wrong_nonce()));

        // The lock must have been released even though submission failed.
        let second = locks.acquire("dummy-unused").await;
        assert!(second.is_ok());
    }
}
