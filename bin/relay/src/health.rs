//! Startup self-test aggregating mirror-node and cache reachability (spec
//! supplement: a minimal `relay_health()` check, not a new RPC method).

use relay_consensus::ConsensusNodeSdk;
use relay_mirror::path_labels;
use relay_primitives::context::RequestContext;
use relay_rpc::RelayServices;

#[derive(Debug, Clone, Copy)]
pub struct HealthReport {
    pub mirror_ok: bool,
    pub cache_ok: bool,
}

impl HealthReport {
    pub fn is_healthy(self) -> bool {
        self.mirror_ok && self.cache_ok
    }
}

pub async fn relay_health<S: ConsensusNodeSdk>(services: &RelayServices<S>) -> HealthReport {
    let ctx = RequestContext::generated("startup-health-check");

    let mirror_ok = services
        .mirror
        .request(relay_mirror::MirrorRequest::get("network/fees", path_labels::NETWORK_FEES), &ctx)
        .await
        .is_ok();

    let probe_key = "health:probe";
    services
        .cache
        .main()
        .set(probe_key, b"1".to_vec(), relay_cache::Ttl::For(std::time::Duration::from_secs(5)), "relayHealth")
        .await;
    let cache_ok = services.cache.main().get(probe_key, "relayHealth").await.is_some();

    HealthReport { mirror_ok, cache_ok }
}
