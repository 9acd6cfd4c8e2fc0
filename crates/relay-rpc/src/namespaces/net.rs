//! `net_*` namespace (spec §6 external interface).

use std::sync::Arc;

use relay_consensus::ConsensusNodeSdk;
use relay_primitives::context::RequestContext;
use relay_primitives::json::JsonValue;

use crate::error::DispatchError;
use crate::registry::RegistryBuilder;
use crate::services::RelayServices;

pub fn register<S: ConsensusNodeSdk + 'static>(builder: &mut RegistryBuilder<S>) {
    builder.register("net", "version", version);
    builder.register("net", "listening", listening);
    builder.register("net", "peerCount", peer_count);
}

/// `net_version` returns the chain id as a plain decimal string, the one
/// place in the wire protocol a chain id is *not* `0x`-prefixed.
async fn version<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let decimal = super::parse_hex_u64(&services.config.chain_id).unwrap_or(0);
    Ok(JsonValue::String(decimal.to_string()))
}

/// The relay always presents itself as listening; it never actually joins
/// a peer-to-peer network (spec Non-goals: no block production).
async fn listening<S: ConsensusNodeSdk>(
    _services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    Ok(JsonValue::Bool(true))
}

async fn peer_count<S: ConsensusNodeSdk>(
    _services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    Ok(super::hex_u64(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_services;

    #[tokio::test]
    async fn version_is_plain_decimal_not_hex() {
        let services = test_services();
        let result = version(services, vec![], RequestContext::new("r", "127.0.0.1")).await.unwrap();
        assert_eq!(result, JsonValue::String("298".to_string()));
    }
}
