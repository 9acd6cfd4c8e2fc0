//! `admin_*` namespace (spec §6 external interface).
//!
//! Exposes only the subset of configuration safe to hand back to a caller —
//! no Redis URL, no mirror-node API key (spec Non-goals: no admin GUI, and
//! more generally nothing here leaks operator secrets).

use std::sync::Arc;

use relay_consensus::ConsensusNodeSdk;
use relay_primitives::context::RequestContext;
use relay_primitives::json::JsonValue;

use crate::error::DispatchError;
use crate::registry::RegistryBuilder;
use crate::services::RelayServices;

pub fn register<S: ConsensusNodeSdk + 'static>(builder: &mut RegistryBuilder<S>) {
    builder.register("admin", "config", config);
}

async fn config<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let cfg = &services.config;
    Ok(JsonValue::Object(vec![
        ("chainId".to_string(), JsonValue::String(cfg.chain_id.clone())),
        ("readOnly".to_string(), JsonValue::Bool(cfg.read_only)),
        ("enableTxPool".to_string(), JsonValue::Bool(cfg.enable_tx_pool)),
        ("mirrorNodeUrl".to_string(), JsonValue::String(cfg.mirror_node.mirror_node_url.clone())),
        (
            "workersPoolMaxThreads".to_string(),
            super::hex_u64(cfg.workers.workers_pool_max_threads as u64),
        ),
        ("debugMode".to_string(), JsonValue::Bool(cfg.debug_mode)),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_services;

    #[tokio::test]
    async fn config_never_includes_the_redis_url() {
        let services = test_services();
        let result = config(services, vec![], RequestContext::new("r", "127.0.0.1")).await.unwrap();
        let JsonValue::Object(fields) = result else { panic!("expected object") };
        assert!(fields.iter().all(|(k, _)| k != "redisUrl"));
    }
}
