//! Typed configuration tree for the relay (spec §6).
//!
//! One struct per component, `serde(default)` everywhere, loaded from
//! environment variables through the `config` crate. A thin `clap::Parser`
//! wrapper exists only to let the binary override a handful of options from
//! the command line; the environment remains the source of truth, matching
//! how the source system is configured (env-var driven, no config file).

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_cache_max() -> u64 {
    1000
}
fn default_cache_ttl_ms() -> u64 {
    3_600_000
}
fn default_redis_reconnect_delay_ms() -> u64 {
    1000
}
fn default_mirror_timeout_ms() -> u64 {
    10_000
}
fn default_mirror_max_redirects() -> u32 {
    5
}
fn default_http_keep_alive() -> bool {
    true
}
fn default_http_keep_alive_msecs() -> u64 {
    1000
}
fn default_http_max_sockets() -> usize {
    300
}
fn default_http_max_total_sockets() -> usize {
    300
}
fn default_http_socket_timeout_ms() -> u64 {
    60_000
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    500
}
fn default_request_retry_count() -> u32 {
    10
}
fn default_retry_codes() -> Vec<u16> {
    vec![408, 425, 429, 500, 502, 503, 504]
}
fn default_limit_param() -> u32 {
    100
}
fn default_contract_results_pg_max() -> usize {
    25
}
fn default_contract_results_logs_pg_max() -> usize {
    25
}
fn default_eth_call_accepted_errors() -> Vec<u16> {
    vec![400, 404, 415, 429, 500]
}
fn default_sdk_request_timeout_ms() -> u64 {
    10_000
}
fn default_consensus_max_execution_time_ms() -> u64 {
    15_000
}
fn default_file_append_chunk_size() -> usize {
    4096
}
fn default_file_append_max_chunks() -> usize {
    20
}
fn default_max_gas_allowance_hbar() -> i64 {
    0
}
fn default_hbar_rate_limit_duration_ms() -> u64 {
    86_400_000
}
fn default_workers_pool_min_threads() -> usize {
    2
}
fn default_workers_pool_max_threads() -> usize {
    16
}
fn default_chain_id() -> String {
    "0x12a".to_string()
}
fn default_pending_tx_storage_ttl_ms() -> u64 {
    60_000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}
fn default_server_port() -> u16 {
    7546
}
fn default_metrics_port() -> u16 {
    9464
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(rename = "cache_max", default = "default_cache_max")]
    pub cache_max: u64,
    #[serde(rename = "cache_ttl", default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
    pub redis_url: Option<String>,
    #[serde(default = "default_redis_reconnect_delay_ms")]
    pub redis_reconnect_delay_ms: u64,
    pub multi_set: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_max: default_cache_max(),
            cache_ttl_ms: default_cache_ttl_ms(),
            redis_url: None,
            redis_reconnect_delay_ms: default_redis_reconnect_delay_ms(),
            multi_set: false,
        }
    }
}

impl CacheConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorNodeConfig {
    pub mirror_node_url: String,
    pub mirror_node_url_web3: String,
    #[serde(default = "default_mirror_timeout_ms")]
    pub mirror_node_timeout_ms: u64,
    #[serde(default = "default_mirror_max_redirects")]
    pub mirror_node_max_redirects: u32,
    #[serde(default = "default_http_keep_alive")]
    pub mirror_node_http_keep_alive: bool,
    #[serde(default = "default_http_keep_alive_msecs")]
    pub mirror_node_http_keep_alive_msecs: u64,
    #[serde(default = "default_http_max_sockets")]
    pub mirror_node_http_max_sockets: usize,
    #[serde(default = "default_http_max_total_sockets")]
    pub mirror_node_http_max_total_sockets: usize,
    #[serde(default = "default_http_socket_timeout_ms")]
    pub mirror_node_http_socket_timeout_ms: u64,
    #[serde(default = "default_retries")]
    pub mirror_node_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub mirror_node_retry_delay_ms: u64,
    #[serde(default = "default_request_retry_count")]
    pub mirror_node_request_retry_count: u32,
    #[serde(default = "default_retry_codes")]
    pub mirror_node_retry_codes: Vec<u16>,
    pub mirror_node_agent_cacheable_dns: bool,
    #[serde(default = "default_limit_param")]
    pub mirror_node_limit_param: u32,
    #[serde(default = "default_contract_results_pg_max")]
    pub mirror_node_contract_results_pg_max: usize,
    #[serde(default = "default_contract_results_logs_pg_max")]
    pub mirror_node_contract_results_logs_pg_max: usize,
    pub mirror_node_url_header_x_api_key: Option<String>,
    pub use_mirror_node_modularized_services: bool,
    #[serde(default = "default_eth_call_accepted_errors")]
    pub eth_call_accepted_errors: Vec<u16>,
}

impl Default for MirrorNodeConfig {
    fn default() -> Self {
        Self {
            mirror_node_url: "https://testnet.mirrornode.hedera.com/api/v1".to_string(),
            mirror_node_url_web3: "https://testnet.mirrornode.hedera.com/api/v1".to_string(),
            mirror_node_timeout_ms: default_mirror_timeout_ms(),
            mirror_node_max_redirects: default_mirror_max_redirects(),
            mirror_node_http_keep_alive: default_http_keep_alive(),
            mirror_node_http_keep_alive_msecs: default_http_keep_alive_msecs(),
            mirror_node_http_max_sockets: default_http_max_sockets(),
            mirror_node_http_max_total_sockets: default_http_max_total_sockets(),
            mirror_node_http_socket_timeout_ms: default_http_socket_timeout_ms(),
            mirror_node_retries: default_retries(),
            mirror_node_retry_delay_ms: default_retry_delay_ms(),
            mirror_node_request_retry_count: default_request_retry_count(),
            mirror_node_retry_codes: default_retry_codes(),
            mirror_node_agent_cacheable_dns: false,
            mirror_node_limit_param: default_limit_param(),
            mirror_node_contract_results_pg_max: default_contract_results_pg_max(),
            mirror_node_contract_results_logs_pg_max: default_contract_results_logs_pg_max(),
            mirror_node_url_header_x_api_key: None,
            use_mirror_node_modularized_services: false,
            eth_call_accepted_errors: default_eth_call_accepted_errors(),
        }
    }
}

impl MirrorNodeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.mirror_node_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.mirror_node_retry_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    #[serde(default = "default_sdk_request_timeout_ms")]
    pub sdk_request_timeout_ms: u64,
    #[serde(default = "default_consensus_max_execution_time_ms")]
    pub consensus_max_execution_time_ms: u64,
    #[serde(default = "default_file_append_chunk_size")]
    pub file_append_chunk_size: usize,
    #[serde(default = "default_file_append_max_chunks")]
    pub file_append_max_chunks: usize,
    pub jumbo_tx_enabled: bool,
    #[serde(default = "default_max_gas_allowance_hbar")]
    pub max_gas_allowance_hbar: i64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            sdk_request_timeout_ms: default_sdk_request_timeout_ms(),
            consensus_max_execution_time_ms: default_consensus_max_execution_time_ms(),
            file_append_chunk_size: default_file_append_chunk_size(),
            file_append_max_chunks: default_file_append_max_chunks(),
            jumbo_tx_enabled: false,
            max_gas_allowance_hbar: default_max_gas_allowance_hbar(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HbarLimiterConfig {
    #[serde(default = "default_hbar_rate_limit_duration_ms")]
    pub hbar_rate_limit_duration_ms: u64,
}

impl Default for HbarLimiterConfig {
    fn default() -> Self {
        Self { hbar_rate_limit_duration_ms: default_hbar_rate_limit_duration_ms() }
    }
}

impl HbarLimiterConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.hbar_rate_limit_duration_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    #[serde(default = "default_workers_pool_min_threads")]
    pub workers_pool_min_threads: usize,
    #[serde(default = "default_workers_pool_max_threads")]
    pub workers_pool_max_threads: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            workers_pool_min_threads: default_workers_pool_min_threads(),
            workers_pool_max_threads: default_workers_pool_max_threads(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub test: bool,
    pub client_transport_security: bool,
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    pub read_only: bool,
    pub enable_tx_pool: bool,
    #[serde(default = "default_pending_tx_storage_ttl_ms")]
    pub pending_transaction_storage_ttl_ms: u64,
    pub get_record_default_to_consensus_node: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub debug_mode: bool,

    /// Not part of spec.md §6's option list (that list covers the library
    /// components only); the bind address and metrics port are
    /// `bin/relay`'s own ambient wiring concern.
    #[serde(default = "default_server_host")]
    pub server_host: String,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    #[serde(flatten)]
    pub cache: CacheConfig,
    #[serde(flatten)]
    pub mirror_node: MirrorNodeConfig,
    #[serde(flatten)]
    pub consensus: ConsensusConfig,
    #[serde(flatten)]
    pub hbar_limiter: HbarLimiterConfig,
    #[serde(flatten)]
    pub workers: WorkersConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            test: false,
            client_transport_security: false,
            chain_id: default_chain_id(),
            read_only: false,
            enable_tx_pool: true,
            pending_transaction_storage_ttl_ms: default_pending_tx_storage_ttl_ms(),
            get_record_default_to_consensus_node: false,
            log_level: default_log_level(),
            debug_mode: false,
            server_host: default_server_host(),
            server_port: default_server_port(),
            metrics_port: default_metrics_port(),
            cache: CacheConfig::default(),
            mirror_node: MirrorNodeConfig::default(),
            consensus: ConsensusConfig::default(),
            hbar_limiter: HbarLimiterConfig::default(),
            workers: WorkersConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Loads configuration from process environment variables, falling back
    /// to the defaults above for anything unset. Variable names match
    /// spec §6 verbatim (case-insensitive, as `config::Environment` treats
    /// them).
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()
    }

    pub fn pending_transaction_storage_ttl(&self) -> Duration {
        Duration::from_millis(self.pending_transaction_storage_ttl_ms)
    }
}

/// Thin CLI surface kept separate from [`RelayConfig`] so the environment
/// variables listed in spec §6 remain the single source of truth; only the
/// handful of options worth overriding for local runs are exposed here.
#[derive(Debug, clap::Parser)]
#[command(name = "relay", about = "Hedera JSON-RPC relay")]
pub struct Cli {
    /// Override MIRROR_NODE_URL.
    #[arg(long, env = "MIRROR_NODE_URL")]
    pub mirror_node_url: Option<String>,

    /// Override CHAIN_ID.
    #[arg(long, env = "CHAIN_ID")]
    pub chain_id: Option<String>,

    /// Run in read-only mode (disables write RPC methods).
    #[arg(long, env = "READ_ONLY")]
    pub read_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_without_env() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.cache.cache_max, 1000);
        assert_eq!(cfg.consensus.file_append_chunk_size, 4096);
        assert_eq!(cfg.workers.workers_pool_max_threads, 16);
    }

    #[test]
    fn cache_ttl_zero_means_indefinite_is_caller_responsibility() {
        // ttl=0 is a valid, meaningful value (spec invariant 1); the config
        // layer must not coerce it to the default.
        let mut cfg = CacheConfig::default();
        cfg.cache_ttl_ms = 0;
        assert_eq!(cfg.cache_ttl(), Duration::from_millis(0));
    }
}
