//! `debug_*` namespace (spec §6 external interface).
//!
//! Registered so the method is discoverable and returns a proper JSON-RPC
//! error rather than an HTTP 404, but not actually implemented: tracing a
//! transaction would require re-executing EVM bytecode, which is explicitly
//! out of scope (spec §1 Non-goals: "smart-contract execution").

use std::sync::Arc;

use relay_consensus::ConsensusNodeSdk;
use relay_primitives::context::RequestContext;
use relay_primitives::error::{JsonRpcError, RelayErrorKind};
use relay_primitives::json::JsonValue;

use crate::error::DispatchError;
use crate::registry::RegistryBuilder;
use crate::services::RelayServices;

pub fn register<S: ConsensusNodeSdk + 'static>(builder: &mut RegistryBuilder<S>) {
    builder.register("debug", "traceTransaction", trace_transaction);
}

async fn trace_transaction<S: ConsensusNodeSdk>(
    _services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    Err(JsonRpcError::new(RelayErrorKind::UnsupportedMethod, "debug_traceTransaction is not supported").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_services;

    #[tokio::test]
    async fn trace_transaction_is_registered_but_unsupported() {
        let services = test_services();
        let result = trace_transaction(services, vec![], RequestContext::new("r", "127.0.0.1")).await;
        assert!(matches!(
            result,
            Err(DispatchError::JsonRpc(e)) if e.kind == RelayErrorKind::UnsupportedMethod
        ));
    }
}
