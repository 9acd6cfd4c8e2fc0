//! The three error shapes a handler may return, and their mapping onto the
//! JSON-RPC wire format (spec §4.8 step 3, §7).
//!
//! The dispatcher passes `JsonRpcError` through untouched; `MirrorNodeClientError`
//! and `SdkClientError` are also returned as-is by the handler layer (spec:
//! "higher layer will map to JSON-RPC error codes in a later refinement") —
//! this module *is* that later refinement, living at the boundary where the
//! wire format is actually produced.

use jsonrpsee_types::error::{ErrorObject, ErrorObjectOwned};
use relay_consensus::{RawTransactionError, SdkClientError};
use relay_lock::LockError;
use relay_mirror::MirrorNodeClientError;
use relay_primitives::error::{JsonRpcError, RelayErrorKind, RpcErrorCode};
use relay_txpool::TxPoolError;
use relay_workers::WorkerTaskError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    JsonRpc(#[from] JsonRpcError),
    #[error(transparent)]
    MirrorNode(#[from] MirrorNodeClientError),
    #[error(transparent)]
    Sdk(#[from] SdkClientError),
}

impl DispatchError {
    /// The `RelayErrorKind` label used for logging/metrics, independent of
    /// which concrete variant this is (spec §7 taxonomy table).
    pub fn kind(&self) -> RelayErrorKind {
        match self {
            Self::JsonRpc(e) => e.kind,
            Self::MirrorNode(_) => RelayErrorKind::InternalError,
            Self::Sdk(e) if e.is_wrong_nonce() => RelayErrorKind::SdkWrongNonce,
            Self::Sdk(_) => RelayErrorKind::InternalError,
        }
    }
}

impl From<DispatchError> for ErrorObjectOwned {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::JsonRpc(e) => e.into(),
            DispatchError::MirrorNode(e) => {
                ErrorObject::owned(RpcErrorCode::INTERNAL_ERROR, e.message.clone(), e.detail.clone())
            }
            DispatchError::Sdk(e) if e.is_wrong_nonce() => ErrorObject::owned(
                RpcErrorCode::SDK_WRONG_NONCE,
                e.message.clone(),
                e.transaction_id.clone(),
            ),
            DispatchError::Sdk(e) => {
                ErrorObject::owned(RpcErrorCode::INTERNAL_ERROR, e.message.clone(), e.transaction_id.clone())
            }
        }
    }
}

impl From<RawTransactionError> for DispatchError {
    fn from(err: RawTransactionError) -> Self {
        match err {
            RawTransactionError::Decode(message) => {
                JsonRpcError::new(RelayErrorKind::InvalidParams, message).into()
            }
            RawTransactionError::Sdk(e) => e.into(),
            RawTransactionError::Lock(LockError::WaitTimeout(sender)) => {
                JsonRpcError::lock_wait_timeout(&sender).into()
            }
            RawTransactionError::Lock(LockError::BackendUnavailable(message)) => {
                JsonRpcError::internal(message).into()
            }
            RawTransactionError::TxPool(e) => JsonRpcError::internal(e.to_string()).into(),
            RawTransactionError::HbarRateLimitExceeded => JsonRpcError::hbar_rate_limit_exceeded().into(),
        }
    }
}

impl From<LockError> for DispatchError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::WaitTimeout(sender) => JsonRpcError::lock_wait_timeout(&sender).into(),
            LockError::BackendUnavailable(message) => JsonRpcError::internal(message).into(),
        }
    }
}

impl From<TxPoolError> for DispatchError {
    fn from(err: TxPoolError) -> Self {
        JsonRpcError::internal(err.to_string()).into()
    }
}

impl From<WorkerTaskError> for DispatchError {
    fn from(err: WorkerTaskError) -> Self {
        match err {
            WorkerTaskError::JsonRpc(e) => e.into(),
            WorkerTaskError::MirrorNode(e) => e.into(),
            WorkerTaskError::Internal(message) => JsonRpcError::internal(message).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdk_wrong_nonce_maps_to_its_own_code() {
        let err: DispatchError = SdkClientError::new("WRONG_NONCE", "nonce too low").into();
        let obj: ErrorObjectOwned = err.into();
        assert_eq!(obj.code(), RpcErrorCode::SDK_WRONG_NONCE);
    }

    #[test]
    fn mirror_node_error_maps_to_internal() {
        let err: DispatchError = MirrorNodeClientError::new(503, "unavailable").into();
        let obj: ErrorObjectOwned = err.into();
        assert_eq!(obj.code(), RpcErrorCode::INTERNAL_ERROR);
    }
}
