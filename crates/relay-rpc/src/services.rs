//! The bundle of components every handler dispatches into (spec §4.8,
//! "Registry holds references to every component").

use std::sync::Arc;

use relay_cache::RelayCache;
use relay_config::RelayConfig;
use relay_consensus::{ConsensusNodeSdk, ConsensusSubmissionClient};
use relay_hbar_limiter::HbarSpendingLimiter;
use relay_mirror::MirrorNodeClient;
use relay_txpool::PendingTransactionPoolService;
use relay_workers::WorkerPool;

pub struct RelayServices<S> {
    pub config: RelayConfig,
    pub cache: Arc<RelayCache>,
    pub mirror: Arc<MirrorNodeClient>,
    pub txpool: Arc<PendingTransactionPoolService>,
    pub hbar_limiter: Arc<HbarSpendingLimiter>,
    pub consensus: Arc<ConsensusSubmissionClient<S>>,
    pub workers: Arc<WorkerPool>,
}

impl<S: ConsensusNodeSdk> RelayServices<S> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: RelayConfig,
        cache: Arc<RelayCache>,
        mirror: Arc<MirrorNodeClient>,
        txpool: Arc<PendingTransactionPoolService>,
        hbar_limiter: Arc<HbarSpendingLimiter>,
        consensus: Arc<ConsensusSubmissionClient<S>>,
        workers: Arc<WorkerPool>,
    ) -> Self {
        Self { config, cache, mirror, txpool, hbar_limiter, consensus, workers }
    }
}
