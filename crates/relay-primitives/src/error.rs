//! Error taxonomy shared by every component (spec §7).
//!
//! Each component still defines its own `thiserror` enum for the errors it
//! can actually produce; this module gives them a common `RelayErrorKind`
//! tag plus the JSON-RPC custom codes so the dispatcher can map any of them
//! to the wire format without knowing the concrete source type.

use jsonrpsee_types::error::{ErrorObject, ErrorObjectOwned};

/// JSON-RPC 2.0 reserved and relay-custom error codes.
pub struct RpcErrorCode;

impl RpcErrorCode {
    pub const UNSUPPORTED_METHOD: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const PAGINATION_MAX: i32 = -32001;
    pub const DEPENDENT_SERVICE_IMMATURE_RECORDS: i32 = -32002;
    pub const HBAR_RATE_LIMIT_EXCEEDED: i32 = -32003;
    pub const LOCK_WAIT_TIMEOUT: i32 = -32004;
    pub const INSUFFICIENT_ACCOUNT_BALANCE: i32 = -32005;
    pub const SDK_WRONG_NONCE: i32 = -32006;
}

/// The kind of error a component observed, independent of which concrete
/// type carries it. Used for logging/metrics labels and for deciding
/// whether an error is user-visible or internally recovered (spec §7 table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayErrorKind {
    UnsupportedMethod,
    InvalidParams,
    InternalError,
    PaginationMax,
    DependentServiceImmatureRecords,
    HbarRateLimitExceeded,
    LockWaitTimeout,
    MirrorNodeAcceptedAbsent,
    RedisUnavailable,
    SdkWrongNonce,
    TransportErrorNoStatus,
}

impl RelayErrorKind {
    /// Whether this kind is ever surfaced to the JSON-RPC caller (vs fully
    /// recovered inside the component that observed it).
    pub const fn is_user_visible(self) -> bool {
        !matches!(
            self,
            Self::MirrorNodeAcceptedAbsent | Self::RedisUnavailable | Self::TransportErrorNoStatus
        )
    }

    pub const fn rpc_code(self) -> i32 {
        match self {
            Self::UnsupportedMethod => RpcErrorCode::UNSUPPORTED_METHOD,
            Self::InvalidParams => RpcErrorCode::INVALID_PARAMS,
            Self::InternalError | Self::TransportErrorNoStatus => RpcErrorCode::INTERNAL_ERROR,
            Self::PaginationMax => RpcErrorCode::PAGINATION_MAX,
            Self::DependentServiceImmatureRecords => {
                RpcErrorCode::DEPENDENT_SERVICE_IMMATURE_RECORDS
            }
            Self::HbarRateLimitExceeded => RpcErrorCode::HBAR_RATE_LIMIT_EXCEEDED,
            Self::LockWaitTimeout => RpcErrorCode::LOCK_WAIT_TIMEOUT,
            Self::SdkWrongNonce => RpcErrorCode::SDK_WRONG_NONCE,
            // Recovered kinds never reach the wire as an error, but still
            // need a code for completeness of the mapping.
            Self::MirrorNodeAcceptedAbsent | Self::RedisUnavailable => {
                RpcErrorCode::INTERNAL_ERROR
            }
        }
    }
}

/// Minimal `JsonRpcError`, the type dispatch returns as-is for errors it does
/// not need to reinterpret (spec §4.8 step 3).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct JsonRpcError {
    pub kind: RelayErrorKind,
    pub message: String,
    pub data: Option<String>,
}

impl JsonRpcError {
    pub fn new(kind: RelayErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), data: None }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn unsupported_method(name: &str) -> Self {
        Self::new(RelayErrorKind::UnsupportedMethod, format!("Unknown method {name}"))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(RelayErrorKind::InternalError, message)
    }

    pub fn pagination_max(page_max: usize) -> Self {
        Self::new(
            RelayErrorKind::PaginationMax,
            format!("Exceeded maximum mirror node pagination count: {page_max}"),
        )
    }

    pub fn dependent_service_immature_records() -> Self {
        Self::new(
            RelayErrorKind::DependentServiceImmatureRecords,
            "Dependent service returned immature records",
        )
    }

    pub fn lock_wait_timeout(sender: &str) -> Self {
        Self::new(RelayErrorKind::LockWaitTimeout, format!("Timed out waiting for lock on {sender}"))
    }

    pub fn hbar_rate_limit_exceeded() -> Self {
        Self::new(RelayErrorKind::HbarRateLimitExceeded, "HBAR rate limit exceeded")
    }
}

impl From<JsonRpcError> for ErrorObjectOwned {
    fn from(err: JsonRpcError) -> Self {
        ErrorObject::owned(err.kind.rpc_code(), err.message.clone(), err.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_method_maps_to_32601() {
        let err = JsonRpcError::unsupported_method("eth_bogus");
        assert_eq!(err.kind.rpc_code(), -32601);
    }

    #[test]
    fn recovered_kinds_are_not_user_visible() {
        assert!(!RelayErrorKind::MirrorNodeAcceptedAbsent.is_user_visible());
        assert!(RelayErrorKind::PaginationMax.is_user_visible());
    }
}
