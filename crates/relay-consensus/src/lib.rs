//! Consensus-node submission client (spec §4.6 `C6`): raw transaction
//! decode, oversized call-data file chunking, fee computation, and the
//! full per-sender-locked submission path.

pub mod client;
pub mod decode;
pub mod error;
pub mod fees;
pub mod file_chunking;
pub mod sdk;

pub use client::ConsensusSubmissionClient;
pub use error::{RawTransactionError, SdkClientError};
pub use sdk::{ConsensusNodeSdk, EthereumTransactionRequest, FileId, SdkExecutionResult, SubsidisedRecipients};
