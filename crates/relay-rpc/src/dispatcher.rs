//! The dispatcher (spec §4.8 `dispatch(rpcMethodName, params, ctx)`).

use std::sync::Arc;

use relay_consensus::ConsensusNodeSdk;
use relay_primitives::context::RequestContext;
use relay_primitives::error::JsonRpcError;
use relay_primitives::json::JsonValue;
use tracing::{error, instrument};

use crate::error::DispatchError;
use crate::registry::Registry;
use crate::services::RelayServices;

/// Looks up `method`, rearranges `params` (the per-method rearranger lives
/// inside each handler; the default behaviour of "append ctx last" is
/// satisfied by every handler's signature already taking `ctx` as its final
/// argument), invokes it, and classifies whatever it returns (spec §4.8
/// steps 1-3).
#[instrument(skip(registry, services, params), fields(request_id = %ctx.request_id()))]
pub async fn dispatch<S: ConsensusNodeSdk + 'static>(
    registry: &Registry<S>,
    services: Arc<RelayServices<S>>,
    method: &str,
    params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let Some(entry) = registry.lookup(method) else {
        relay_metrics::record_rpc_call(method, "unsupported");
        return Err(JsonRpcError::unsupported_method(method).into());
    };

    let result = (entry.handler)(services, params, ctx.clone()).await;

    match &result {
        Ok(_) => relay_metrics::record_rpc_call(entry.method_name, "success"),
        Err(DispatchError::JsonRpc(e)) if !e.kind.is_user_visible() => {
            relay_metrics::record_rpc_call(entry.method_name, "recovered");
        }
        Err(err) => {
            relay_metrics::record_rpc_call(entry.method_name, "failure");
            error!(method = entry.method_name, request_id = %ctx.request_id(), error = %err, "rpc handler failed");
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::build_registry;
    use crate::test_support::test_services;

    #[tokio::test]
    async fn unsupported_method_maps_to_unsupported_method_error() {
        let registry = build_registry::<crate::test_support::NoopSdk>();
        let services = test_services();
        let ctx = RequestContext::new("req-1", "127.0.0.1");

        let result = dispatch(&registry, services, "eth_bogusMethod", vec![], ctx).await;

        assert!(matches!(
            result,
            Err(DispatchError::JsonRpc(e)) if e.kind == relay_primitives::error::RelayErrorKind::UnsupportedMethod
        ));
    }

    #[tokio::test]
    async fn eth_chain_id_dispatches_without_touching_mirror() {
        let registry = build_registry::<crate::test_support::NoopSdk>();
        let services = test_services();
        let ctx = RequestContext::new("req-1", "127.0.0.1");

        let result = dispatch(&registry, services, "eth_chainId", vec![], ctx).await.unwrap();
        assert_eq!(result, JsonValue::String("0x12a".to_string()));
    }
}
