//! The consensus-node SDK boundary.
//!
//! The concrete SDK is an external collaborator (spec §1, "named only by
//! the interface they provide"); this trait is that interface. A production
//! binary plugs in the real Hedera SDK client; tests plug in a fake.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;

use crate::error::SdkClientError;

/// Opaque handle to an auxiliary file object created to hold call data too
/// large to inline on the transaction (spec §4.6 step 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(pub u64, pub u64, pub u64);

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.0, self.1, self.2)
    }
}

/// The Ethereum transaction, packaged for the consensus node, exactly as
/// spec §4.6 steps 2-5 leave it: either inline call data, or a file id with
/// call data cleared.
#[derive(Debug, Clone)]
pub struct EthereumTransactionRequest {
    pub raw_rlp: Bytes,
    pub call_data: Option<Bytes>,
    pub call_data_file_id: Option<FileId>,
    pub max_transaction_fee_tinybars: u64,
    pub max_gas_allowance_tinybars: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct SdkExecutionResult {
    pub transaction_id: String,
    pub operator_id: String,
    pub gas_used: Option<u64>,
}

/// Everything the submission client needs from the consensus-node SDK.
#[async_trait]
pub trait ConsensusNodeSdk: Send + Sync {
    async fn current_gas_price_tinybars(&self) -> Result<u64, SdkClientError>;

    /// Creates the first-chunk file object, returning its id.
    async fn create_file(&self, first_chunk: Bytes) -> Result<FileId, SdkClientError>;

    /// Appends one additional chunk to an existing file object.
    async fn append_file(&self, file_id: FileId, chunk: Bytes) -> Result<(), SdkClientError>;

    async fn execute_ethereum_transaction(
        &self,
        request: EthereumTransactionRequest,
    ) -> Result<SdkExecutionResult, SdkClientError>;
}

/// Addresses configured to receive an operator-paid gas allowance on top of
/// their own transaction fee (spec §4.6 step 5, glossary "Subsidised
/// transaction").
#[derive(Debug, Clone, Default)]
pub struct SubsidisedRecipients {
    addresses: Vec<Address>,
}

impl SubsidisedRecipients {
    pub fn new(addresses: Vec<Address>) -> Self {
        Self { addresses }
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.addresses.contains(address)
    }
}
