//! Placeholder [`ConsensusNodeSdk`] (spec §1: the consensus-node SDK is an
//! external collaborator "named only by the interface it provides").
//!
//! No Hedera SDK crate is part of this workspace's dependency stack, so the
//! binary wires this stand-in until a real client is plugged in here; every
//! call fails with a normalised `SdkClientError` rather than panicking, so
//! the relay still starts and serves read-only `eth_*`/`net_*`/`web3_*`
//! methods against the mirror node.

use alloy_primitives::Bytes;
use async_trait::async_trait;
use relay_consensus::{ConsensusNodeSdk, EthereumTransactionRequest, FileId, SdkClientError, SdkExecutionResult};

pub struct UnavailableConsensusSdk;

fn unavailable() -> SdkClientError {
    SdkClientError::new("UNAVAILABLE", "no consensus-node SDK client is configured")
}

#[async_trait]
impl ConsensusNodeSdk for UnavailableConsensusSdk {
    async fn current_gas_price_tinybars(&self) -> Result<u64, SdkClientError> {
        Err(unavailable())
    }

    async fn create_file(&self, _first_chunk: Bytes) -> Result<FileId, SdkClientError> {
        Err(unavailable())
    }

    async fn append_file(&self, _file_id: FileId, _chunk: Bytes) -> Result<(), SdkClientError> {
        Err(unavailable())
    }

    async fn execute_ethereum_transaction(
        &self,
        _request: EthereumTransactionRequest,
    ) -> Result<SdkExecutionResult, SdkClientError> {
        Err(unavailable())
    }
}
