//! Errors the consensus submission client can raise (spec §4.6, §7).

/// Normalised error returned from a consensus-node SDK call. Retains the
/// upstream status string so callers can tell a retryable transport failure
/// from a final precheck/receipt rejection (spec §4.6 step 6, "normalise to
/// SDKClientError retaining status").
#[derive(Debug, Clone, thiserror::Error)]
#[error("consensus node submission failed ({status}): {message}")]
pub struct SdkClientError {
    pub status: String,
    pub message: String,
    /// Set when the upstream rejected the transaction for a reason the
    /// caller should see verbatim rather than a generic internal error.
    pub transaction_id: Option<String>,
}

impl SdkClientError {
    pub fn new(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self { status: status.into(), message: message.into(), transaction_id: None }
    }

    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    /// Whether this failure is the one case that must be rethrown
    /// immediately rather than returning any prior response (spec §4.6
    /// step 6, "a wrong nonce result is rethrown immediately").
    pub fn is_wrong_nonce(&self) -> bool {
        self.status == "WRONG_NONCE"
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RawTransactionError {
    #[error("failed to decode raw transaction: {0}")]
    Decode(String),
    #[error(transparent)]
    Sdk(#[from] SdkClientError),
    #[error(transparent)]
    Lock(#[from] relay_lock::LockError),
    #[error(transparent)]
    TxPool(#[from] relay_txpool::TxPoolError),
    #[error("caller's HBAR spending plan would be exceeded")]
    HbarRateLimitExceeded,
}
