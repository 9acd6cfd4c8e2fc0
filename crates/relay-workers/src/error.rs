//! Typed error envelope crossing the worker boundary (spec §4.7
//! `wrapError`/`unwrapError`, §8 "Error round-trip across worker boundary").
//!
//! `relay-workers` tasks are plain `tokio` tasks in the same address space
//! (see `pool.rs`), so nothing actually needs to cross a process boundary;
//! the envelope still exists because the spec's round-trip property is
//! about preserving error identity across *any* boundary a task result
//! passes through, including a `JoinHandle`.

use relay_mirror::MirrorNodeClientError;
use relay_primitives::error::{JsonRpcError, RelayErrorKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, thiserror::Error)]
pub enum WorkerTaskError {
    #[error(transparent)]
    JsonRpc(#[from] JsonRpcError),
    #[error(transparent)]
    MirrorNode(#[from] MirrorNodeClientError),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorEnvelope {
    name: String,
    kind: Option<String>,
    message: String,
    status_code: Option<u16>,
    data: Option<String>,
}

fn kind_to_name(kind: RelayErrorKind) -> &'static str {
    match kind {
        RelayErrorKind::UnsupportedMethod => "UnsupportedMethod",
        RelayErrorKind::InvalidParams => "InvalidParams",
        RelayErrorKind::InternalError => "InternalError",
        RelayErrorKind::PaginationMax => "PaginationMax",
        RelayErrorKind::DependentServiceImmatureRecords => "DependentServiceImmatureRecords",
        RelayErrorKind::HbarRateLimitExceeded => "HbarRateLimitExceeded",
        RelayErrorKind::LockWaitTimeout => "LockWaitTimeout",
        RelayErrorKind::MirrorNodeAcceptedAbsent => "MirrorNodeAcceptedAbsent",
        RelayErrorKind::RedisUnavailable => "RedisUnavailable",
        RelayErrorKind::SdkWrongNonce => "SdkWrongNonce",
        RelayErrorKind::TransportErrorNoStatus => "TransportErrorNoStatus",
    }
}

fn name_to_kind(name: &str) -> Option<RelayErrorKind> {
    Some(match name {
        "UnsupportedMethod" => RelayErrorKind::UnsupportedMethod,
        "InvalidParams" => RelayErrorKind::InvalidParams,
        "InternalError" => RelayErrorKind::InternalError,
        "PaginationMax" => RelayErrorKind::PaginationMax,
        "DependentServiceImmatureRecords" => RelayErrorKind::DependentServiceImmatureRecords,
        "HbarRateLimitExceeded" => RelayErrorKind::HbarRateLimitExceeded,
        "LockWaitTimeout" => RelayErrorKind::LockWaitTimeout,
        "MirrorNodeAcceptedAbsent" => RelayErrorKind::MirrorNodeAcceptedAbsent,
        "RedisUnavailable" => RelayErrorKind::RedisUnavailable,
        "SdkWrongNonce" => RelayErrorKind::SdkWrongNonce,
        "TransportErrorNoStatus" => RelayErrorKind::TransportErrorNoStatus,
        _ => return None,
    })
}

/// Serialises `err` into the JSON envelope that crosses the worker
/// boundary.
pub fn wrap_error(err: &WorkerTaskError) -> String {
    let envelope = match err {
        WorkerTaskError::JsonRpc(e) => ErrorEnvelope {
            name: "JsonRpcError".to_string(),
            kind: Some(kind_to_name(e.kind).to_string()),
            message: e.message.clone(),
            status_code: None,
            data: e.data.clone(),
        },
        WorkerTaskError::MirrorNode(e) => ErrorEnvelope {
            name: "MirrorNodeClientError".to_string(),
            kind: None,
            message: e.message.clone(),
            status_code: Some(e.status_code),
            data: e.data.as_ref().and_then(|d| serde_json::to_string(d).ok()),
        },
        WorkerTaskError::Internal(message) => ErrorEnvelope {
            name: "InternalError".to_string(),
            kind: Some(kind_to_name(RelayErrorKind::InternalError).to_string()),
            message: message.clone(),
            status_code: None,
            data: None,
        },
    };
    serde_json::to_string(&envelope).unwrap_or_else(|_| {
        r#"{"name":"InternalError","message":"failed to serialise worker error"}"#.to_string()
    })
}

/// Reconstructs a [`WorkerTaskError`] from a string produced by
/// [`wrap_error`]. A name this function doesn't recognise (or malformed
/// JSON) maps to a generic `INTERNAL_ERROR` (spec §4.7).
pub fn unwrap_error(wrapped: &str) -> WorkerTaskError {
    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(wrapped) else {
        return WorkerTaskError::Internal(wrapped.to_string());
    };

    match envelope.name.as_str() {
        "JsonRpcError" => {
            let kind = envelope
                .kind
                .as_deref()
                .and_then(name_to_kind)
                .unwrap_or(RelayErrorKind::InternalError);
            let mut err = JsonRpcError::new(kind, envelope.message);
            if let Some(data) = envelope.data {
                err = err.with_data(data);
            }
            WorkerTaskError::JsonRpc(err)
        }
        "MirrorNodeClientError" => {
            let mut err = MirrorNodeClientError::new(envelope.status_code.unwrap_or(500), envelope.message);
            if let Some(data) = envelope.data {
                err = err.with_data(relay_primitives::json::JsonValue::String(data));
            }
            WorkerTaskError::MirrorNode(err)
        }
        _ => WorkerTaskError::Internal(envelope.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_rpc_error_round_trips_with_kind_and_code() {
        let original = WorkerTaskError::JsonRpc(JsonRpcError::pagination_max(25));
        let wrapped = wrap_error(&original);
        let restored = unwrap_error(&wrapped);

        match (original, restored) {
            (WorkerTaskError::JsonRpc(a), WorkerTaskError::JsonRpc(b)) => {
                assert_eq!(a.kind, b.kind);
                assert_eq!(a.kind.rpc_code(), b.kind.rpc_code());
                assert_eq!(a.message, b.message);
            }
            _ => panic!("expected JsonRpc variant on both sides"),
        }
    }

    #[test]
    fn mirror_node_error_round_trips_with_status_code() {
        let original = WorkerTaskError::MirrorNode(MirrorNodeClientError::new(503, "mirror unavailable"));
        let wrapped = wrap_error(&original);
        let restored = unwrap_error(&wrapped);

        match restored {
            WorkerTaskError::MirrorNode(e) => {
                assert_eq!(e.status_code, 503);
                assert_eq!(e.message, "mirror unavailable");
            }
            _ => panic!("expected MirrorNode variant"),
        }
    }

    #[test]
    fn unknown_envelope_name_maps_to_internal_error() {
        let restored = unwrap_error(r#"{"name":"SomethingElse","message":"boom"}"#);
        assert!(matches!(restored, WorkerTaskError::Internal(_)));
    }

    #[test]
    fn malformed_json_maps_to_internal_error() {
        let restored = unwrap_error("not json");
        assert!(matches!(restored, WorkerTaskError::Internal(_)));
    }
}
