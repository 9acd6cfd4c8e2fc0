//! Top-level relay binary (spec §4.9 `C9`): loads configuration, wires every
//! component, serves the registry over JSON-RPC, and shuts down cleanly.

mod health;
mod sdk_stub;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use jsonrpsee::server::ServerBuilder;
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::RpcModule;
use metrics_exporter_prometheus::PrometheusBuilder;
use relay_cache::RelayCache;
use relay_config::{Cli, RelayConfig};
use relay_consensus::{ConsensusSubmissionClient, SubsidisedRecipients};
use relay_hbar_limiter::HbarSpendingLimiter;
use relay_lock::{DistributedLockManager, LocalLockManager, LockManager};
use relay_mirror::MirrorNodeClient;
use relay_primitives::context::RequestContext;
use relay_primitives::json::JsonValue;
use relay_rpc::{build_registry, RelayServices};
use relay_txpool::{LocalPendingTxStorage, PendingTransactionPoolService, SharedPendingTxStorage};
use relay_workers::WorkerPool;
use tracing::{info, warn};

use sdk_stub::UnavailableConsensusSdk;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    let mut config = RelayConfig::from_env()?;
    if let Some(url) = cli.mirror_node_url {
        config.mirror_node.mirror_node_url = url;
    }
    if let Some(chain_id) = cli.chain_id {
        config.chain_id = chain_id;
    }
    if cli.read_only {
        config.read_only = true;
    }

    init_tracing(&config.log_level);
    relay_metrics::describe();
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], config.metrics_port))
        .install()?;

    let services = build_services(config).await?;

    let report = health::relay_health(&services).await;
    if !report.is_healthy() {
        warn!(mirror_ok = report.mirror_ok, cache_ok = report.cache_ok, "startup health check degraded");
    } else {
        info!("startup health check passed");
    }

    let registry = Arc::new(build_registry::<UnavailableConsensusSdk>());
    let module = build_rpc_module(registry, services.clone())?;

    let addr = format!("{}:{}", services.config.server_host, services.config.server_port);
    let server = ServerBuilder::default().build(addr.as_str()).await?;
    let local_addr = server.local_addr()?;
    let handle = server.start(module);
    info!(%local_addr, "relay listening");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, draining in-flight requests");
    let _ = handle.stop();
    handle.stopped().await;
    info!("shutdown complete");

    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();
}

async fn build_services(config: RelayConfig) -> eyre::Result<Arc<RelayServices<UnavailableConsensusSdk>>> {
    let cache = Arc::new(match &config.cache.redis_url {
        Some(url) => {
            let shared = relay_cache::SharedCache::connect(url, config.cache.multi_set).await?;
            RelayCache::shared(shared)
        }
        None => RelayCache::local(config.cache.cache_max as u32, config.cache.cache_ttl()),
    });

    let mirror = Arc::new(MirrorNodeClient::new(config.mirror_node.clone(), cache.clone())?);

    let txpool_storage: Arc<dyn relay_txpool::PendingTxStorage> = match &config.cache.redis_url {
        Some(url) => Arc::new(
            SharedPendingTxStorage::connect(url, config.pending_transaction_storage_ttl().as_secs())
                .await
                .map_err(|e| eyre::eyre!(e.to_string()))?,
        ),
        None => Arc::new(LocalPendingTxStorage::new()),
    };
    let txpool = Arc::new(PendingTransactionPoolService::new(txpool_storage, config.enable_tx_pool));

    let hbar_limiter = Arc::new(HbarSpendingLimiter::new(u64::MAX, config.hbar_limiter.window()));

    let locks: Arc<dyn LockManager> = match &config.cache.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            let conn = client.get_connection_manager().await?;
            Arc::new(DistributedLockManager::new(conn, Duration::from_secs(30), Duration::from_secs(5)))
        }
        None => Arc::new(LocalLockManager::new(Duration::from_secs(30), Duration::from_secs(5))),
    };

    let consensus = Arc::new(ConsensusSubmissionClient::new(
        Arc::new(UnavailableConsensusSdk),
        config.consensus.clone(),
        locks,
        txpool.clone(),
        hbar_limiter.clone(),
        SubsidisedRecipients::default(),
    ));

    let workers = Arc::new(WorkerPool::new(config.workers.workers_pool_max_threads));

    Ok(Arc::new(RelayServices::new(config, cache, mirror, txpool, hbar_limiter, consensus, workers)))
}

/// Bridges the registry's handler table onto a `jsonrpsee` [`RpcModule`]:
/// one method registered per entry, each forwarding to [`relay_rpc::dispatch`].
fn build_rpc_module(
    registry: Arc<relay_rpc::Registry<UnavailableConsensusSdk>>,
    services: Arc<RelayServices<UnavailableConsensusSdk>>,
) -> eyre::Result<RpcModule<Arc<RelayServices<UnavailableConsensusSdk>>>> {
    let mut module = RpcModule::new(services);

    for method_name in registry.method_names() {
        let registry = registry.clone();
        module.register_async_method(method_name, move |params, services, _extensions| {
            let registry = registry.clone();
            async move {
                let raw_params: Vec<serde_json::Value> = params.parse().unwrap_or_default();
                let json_params: Vec<JsonValue> = raw_params.into_iter().map(JsonValue::from).collect();
                // Connection-level client IP isn't threaded through this
                // minimal server wiring; every request gets a fresh id.
                let ctx = RequestContext::generated("unknown");
                relay_rpc::dispatch(&registry, services, method_name, json_params, ctx)
                    .await
                    .map_err(ErrorObjectOwned::from)
            }
        })?;
    }

    Ok(module)
}
