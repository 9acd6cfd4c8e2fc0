//! `web3_*` namespace (spec §6 external interface).

use std::sync::Arc;

use relay_consensus::ConsensusNodeSdk;
use relay_primitives::context::RequestContext;
use relay_primitives::error::JsonRpcError;
use relay_primitives::json::JsonValue;

use crate::error::DispatchError;
use crate::registry::RegistryBuilder;
use crate::services::RelayServices;
use crate::{params, namespaces::hex_bytes};

pub fn register<S: ConsensusNodeSdk + 'static>(builder: &mut RegistryBuilder<S>) {
    builder.register("web3", "clientVersion", client_version);
    builder.register("web3", "sha3", sha3);
}

async fn client_version<S: ConsensusNodeSdk>(
    _services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    Ok(JsonValue::String(format!("relay/{}", env!("CARGO_PKG_VERSION"))))
}

/// Hashes the raw bytes of the single `data` parameter with Keccak-256,
/// the one RPC method that does real cryptographic work itself rather than
/// delegating to the mirror node or consensus node.
async fn sha3<S: ConsensusNodeSdk>(
    _services: Arc<RelayServices<S>>,
    raw_params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let data = params::required_str(&raw_params, 0, "data").map_err(DispatchError::from)?;
    let bytes = alloy_primitives::hex::decode(data.strip_prefix("0x").unwrap_or(data))
        .map_err(|e| JsonRpcError::new(relay_primitives::error::RelayErrorKind::InvalidParams, e.to_string()))?;
    let hash = alloy_primitives::keccak256(&bytes);
    Ok(hex_bytes(hash.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_services;

    #[tokio::test]
    async fn sha3_hashes_empty_input_to_the_well_known_constant() {
        let services = test_services();
        let result = sha3(services, vec![JsonValue::String("0x".to_string())], RequestContext::new("r", "127.0.0.1"))
            .await
            .unwrap();
        assert_eq!(
            result,
            JsonValue::String(
                "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470".to_string()
            )
        );
    }
}
