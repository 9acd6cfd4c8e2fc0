//! The `eth_*` namespace (spec §6): the bulk of the read surface, plus
//! `eth_sendRawTransaction` for writes.
//!
//! Read handlers follow the flow traced in spec §2 for `eth_getLogs`: check
//! the cache, on miss hand the fetch off to the worker pool, cache the
//! result, return it. Handlers that don't need CPU-bound decoding (a
//! single mirror GET) call the mirror client directly instead of paying
//! for a worker-pool round trip.

use std::sync::Arc;

use relay_cache::Ttl;
use relay_mirror::path_labels;
use relay_primitives::context::RequestContext;
use relay_primitives::error::JsonRpcError;
use relay_primitives::json::{BigNumber, JsonValue};
use relay_consensus::ConsensusNodeSdk;
use relay_workers::{TaskKind, WorkerTaskError};

use crate::error::DispatchError;
use crate::params;
use crate::registry::RegistryBuilder;
use crate::services::RelayServices;

use super::{hex_bytes, hex_u64, parse_hex_u64};

pub fn register<S: ConsensusNodeSdk + 'static>(builder: &mut RegistryBuilder<S>) {
    builder.register("eth", "chainId", chain_id);
    builder.register("eth", "blockNumber", block_number);
    builder.register("eth", "gasPrice", gas_price);
    builder.register("eth", "accounts", accounts);
    builder.register("eth", "mining", mining);
    builder.register("eth", "syncing", syncing);
    builder.register("eth", "getBlockByNumber", get_block_by_number);
    builder.register("eth", "getBlockByHash", get_block_by_hash);
    builder.register("eth", "getTransactionReceipt", get_transaction_receipt);
    builder.register("eth", "getTransactionByHash", get_transaction_by_hash);
    builder.register("eth", "getTransactionCount", get_transaction_count);
    builder.register("eth", "getBalance", get_balance);
    builder.register("eth", "getCode", get_code);
    builder.register("eth", "call", call);
    builder.register("eth", "estimateGas", estimate_gas);
    builder.register("eth", "getLogs", get_logs);
    builder.register("eth", "sendRawTransaction", send_raw_transaction);
}

async fn chain_id<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    // No cache or mirror call for a value fixed at config load time
    // (spec §8 scenario 1).
    Ok(JsonValue::String(services.config.chain_id.clone()))
}

async fn accounts<S: ConsensusNodeSdk>(
    _services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    // The relay never holds private keys on the caller's behalf.
    Ok(JsonValue::Array(Vec::new()))
}

async fn mining<S: ConsensusNodeSdk>(
    _services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    Ok(JsonValue::Bool(false))
}

async fn syncing<S: ConsensusNodeSdk>(
    _services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    Ok(JsonValue::Bool(false))
}

async fn gas_price<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let cache_key = "gasPrice";
    if let Some(cached) = services.cache.main().get_json::<String>(cache_key, "eth_gasPrice").await {
        return Ok(JsonValue::String(cached));
    }

    let response = services
        .mirror
        .request(relay_mirror::MirrorRequest::get("network/fees", path_labels::NETWORK_FEES), &ctx)
        .await
        .map_err(DispatchError::from)?;

    let tinybars = response
        .as_ref()
        .and_then(|v| v.get("fees"))
        .and_then(JsonValue::as_array)
        .and_then(|fees| fees.first())
        .and_then(|fee| fee.get("gas"))
        .and_then(JsonValue::as_number)
        .and_then(BigNumber::as_u256)
        .map(|n| n.saturating_to::<u64>())
        .unwrap_or(710_000_000_000);

    let hex = format!("0x{tinybars:x}");
    services
        .cache
        .main()
        .set_json(cache_key, &hex, Ttl::Default, "eth_gasPrice")
        .await;
    Ok(JsonValue::String(hex))
}

async fn block_number<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let path = "blocks?order=desc&limit=1".to_string();
    let response = services
        .mirror
        .request(relay_mirror::MirrorRequest::get(path, path_labels::BLOCKS), &ctx)
        .await
        .map_err(DispatchError::from)?;

    let number = response
        .as_ref()
        .and_then(|v| v.get("blocks"))
        .and_then(JsonValue::as_array)
        .and_then(|blocks| blocks.first())
        .and_then(|block| block.get("number"))
        .and_then(JsonValue::as_number)
        .and_then(BigNumber::as_u256)
        .map(|n| n.saturating_to::<u64>())
        .unwrap_or(0);

    Ok(hex_u64(number))
}

/// Resolves a block tag/number/hash to the cache-key-and-mirror-path pair
/// used by both `getBlockByNumber` and `getBlockByHash` (spec §8 scenario 2
/// names the cache key `getBlock.latest` verbatim).
fn block_cache_key(identifier: &str) -> String {
    format!("getBlock.{identifier}")
}

async fn fetch_and_cache_block<S: ConsensusNodeSdk + 'static>(
    services: &Arc<RelayServices<S>>,
    identifier: &str,
    ctx: &RequestContext,
) -> Result<Option<JsonValue>, DispatchError> {
    let cache_key = block_cache_key(identifier);
    if let Some(cached) = services.cache.main().get_json::<JsonValue>(&cache_key, "eth_getBlockByNumber").await {
        return Ok(Some(cached));
    }

    let path = format!("blocks/{identifier}");
    let services = services.clone();
    let identifier = identifier.to_string();
    let ctx_owned = ctx.clone();
    let result = services
        .workers
        .run(TaskKind::GetBlock, move || async move {
            let raw = services
                .mirror
                .request(relay_mirror::MirrorRequest::get(path, path_labels::BLOCKS_BY_ID), &ctx_owned)
                .await
                .map_err(WorkerTaskError::from)?;
            Ok(raw.map(mirror_block_to_eth_block))
        })
        .await
        .map_err(DispatchError::from)?;

    if let Some(block) = &result {
        services.cache.main().set_json(&cache_key, block, Ttl::Default, "eth_getBlockByNumber").await;
    }
    Ok(result)
}

fn mirror_block_to_eth_block(raw: JsonValue) -> JsonValue {
    let number = raw.get("number").cloned().unwrap_or(JsonValue::Null);
    let hash = raw.get("hash").cloned().unwrap_or(JsonValue::Null);
    let timestamp_from = raw
        .get("timestamp")
        .and_then(|t| t.get("from"))
        .cloned()
        .unwrap_or(JsonValue::Null);
    let gas_used = raw
        .get("gas_used")
        .and_then(JsonValue::as_number)
        .and_then(BigNumber::as_u256)
        .map(|n| hex_u64(n.saturating_to::<u64>()))
        .unwrap_or_else(|| hex_u64(0));

    JsonValue::Object(vec![
        ("number".to_string(), number),
        ("hash".to_string(), hash),
        (
            "parentHash".to_string(),
            raw.get("previous_hash").cloned().unwrap_or(JsonValue::Null),
        ),
        ("timestamp".to_string(), timestamp_from),
        ("gasUsed".to_string(), gas_used),
        ("gasLimit".to_string(), hex_u64(15_000_000)),
        ("transactions".to_string(), JsonValue::Array(Vec::new())),
        ("logsBloom".to_string(), hex_bytes(&[0u8; 256])),
        ("miner".to_string(), JsonValue::String("0x0000000000000000000000000000000000000000".to_string())),
    ])
}

async fn get_block_by_number<S: ConsensusNodeSdk + 'static>(
    services: Arc<RelayServices<S>>,
    raw_params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let identifier = params::required_str(&raw_params, 0, "blockNumber").map_err(DispatchError::from)?;
    let identifier = if let Some(n) = identifier.strip_prefix("0x") {
        u64::from_str_radix(n, 16)
            .map(|n| n.to_string())
            .unwrap_or_else(|_| identifier.to_string())
    } else {
        identifier.to_string()
    };
    let result = fetch_and_cache_block(&services, &identifier, &ctx).await?;
    Ok(result.unwrap_or(JsonValue::Null))
}

async fn get_block_by_hash<S: ConsensusNodeSdk + 'static>(
    services: Arc<RelayServices<S>>,
    raw_params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let hash = params::required_str(&raw_params, 0, "blockHash").map_err(DispatchError::from)?;
    let result = fetch_and_cache_block(&services, hash, &ctx).await?;
    Ok(result.unwrap_or(JsonValue::Null))
}

async fn get_transaction_receipt<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    raw_params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let tx_hash = params::required_str(&raw_params, 0, "transactionHash").map_err(DispatchError::from)?;
    let result = services.mirror.get_contract_result_with_retry(tx_hash, &ctx).await;
    match result {
        Ok(record) => Ok(contract_result_to_receipt(record)),
        Err(e) if e.kind == relay_primitives::error::RelayErrorKind::DependentServiceImmatureRecords => Err(e.into()),
        Err(_) => Ok(JsonValue::Null),
    }
}

fn contract_result_to_receipt(raw: JsonValue) -> JsonValue {
    let status = raw
        .get("status")
        .and_then(JsonValue::as_str)
        .map(|s| if s == "0x1" || s == "SUCCESS" { hex_u64(1) } else { hex_u64(0) })
        .unwrap_or_else(|| hex_u64(1));

    JsonValue::Object(vec![
        ("transactionHash".to_string(), raw.get("hash").cloned().unwrap_or(JsonValue::Null)),
        ("blockHash".to_string(), raw.get("block_hash").cloned().unwrap_or(JsonValue::Null)),
        ("blockNumber".to_string(), raw.get("block_number").cloned().unwrap_or(JsonValue::Null)),
        (
            "transactionIndex".to_string(),
            raw.get("transaction_index").cloned().unwrap_or(JsonValue::Null),
        ),
        ("from".to_string(), raw.get("from").cloned().unwrap_or(JsonValue::Null)),
        ("to".to_string(), raw.get("to").cloned().unwrap_or(JsonValue::Null)),
        (
            "gasUsed".to_string(),
            raw.get("gas_used").cloned().unwrap_or_else(|| hex_u64(0)),
        ),
        ("status".to_string(), status),
        ("logs".to_string(), raw.get("logs").cloned().unwrap_or(JsonValue::Array(Vec::new()))),
        ("logsBloom".to_string(), hex_bytes(&[0u8; 256])),
    ])
}

async fn get_transaction_by_hash<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    raw_params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let tx_hash = params::required_str(&raw_params, 0, "transactionHash").map_err(DispatchError::from)?;
    let path = format!("transactions/{tx_hash}");
    let response = services
        .mirror
        .request(relay_mirror::MirrorRequest::get(path, path_labels::TRANSACTIONS), &ctx)
        .await
        .map_err(DispatchError::from)?;
    Ok(response.unwrap_or(JsonValue::Null))
}

async fn get_transaction_count<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    raw_params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let address = params::required_str(&raw_params, 0, "address").map_err(DispatchError::from)?;
    let path = format!("accounts/{address}");
    let response = services
        .mirror
        .request(relay_mirror::MirrorRequest::get(path, path_labels::ACCOUNTS), &ctx)
        .await
        .map_err(DispatchError::from)?;

    let nonce = response
        .as_ref()
        .and_then(|v| v.get("ethereum_nonce"))
        .and_then(JsonValue::as_number)
        .and_then(BigNumber::as_u256)
        .map(|n| n.saturating_to::<u64>())
        .unwrap_or(0);
    Ok(hex_u64(nonce))
}

async fn get_balance<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    raw_params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let address = params::required_str(&raw_params, 0, "address").map_err(DispatchError::from)?;
    let path = format!("accounts/{address}");
    let response = services
        .mirror
        .request(relay_mirror::MirrorRequest::get(path, path_labels::ACCOUNTS), &ctx)
        .await
        .map_err(DispatchError::from)?;

    let tinybars = response
        .as_ref()
        .and_then(|v| v.get("balance"))
        .and_then(|b| b.get("balance"))
        .and_then(JsonValue::as_number)
        .and_then(BigNumber::as_u256)
        .map(|n| n.saturating_to::<u128>())
        .unwrap_or(0);
    // 1 tinybar = 10_000_000_000 weibar, the fixed Hedera/Ethereum unit
    // conversion the mirror node itself documents.
    let weibars = alloy_primitives::U256::from(tinybars) * alloy_primitives::U256::from(10_000_000_000u64);
    Ok(JsonValue::String(format!("0x{weibars:x}")))
}

async fn get_code<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    raw_params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let address = params::required_str(&raw_params, 0, "address").map_err(DispatchError::from)?;
    let path = format!("contracts/{address}");
    let response = services
        .mirror
        .request(relay_mirror::MirrorRequest::get(path, path_labels::CONTRACTS), &ctx)
        .await
        .map_err(DispatchError::from)?;

    let bytecode = response
        .as_ref()
        .and_then(|v| v.get("runtime_bytecode"))
        .and_then(JsonValue::as_str)
        .unwrap_or("0x")
        .to_string();
    Ok(JsonValue::String(bytecode))
}

async fn call<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    raw_params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let call_object = params::required(&raw_params, 0, "transaction").map_err(DispatchError::from)?.clone();
    let response = services
        .mirror
        .request(relay_mirror::MirrorRequest::post(
            "contracts/call",
            path_labels::CONTRACT_CALL,
            call_object,
        ), &ctx)
        .await
        .map_err(DispatchError::from)?;

    let result = response
        .as_ref()
        .and_then(|v| v.get("result"))
        .and_then(JsonValue::as_str)
        .unwrap_or("0x")
        .to_string();
    Ok(JsonValue::String(result))
}

async fn estimate_gas<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    raw_params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let mut call_object = params::required(&raw_params, 0, "transaction").map_err(DispatchError::from)?.clone();
    if let JsonValue::Object(fields) = &mut call_object {
        fields.push(("estimate".to_string(), JsonValue::Bool(true)));
    }

    let response = services
        .mirror
        .request(relay_mirror::MirrorRequest::post(
            "contracts/call",
            path_labels::CONTRACT_CALL,
            call_object,
        ), &ctx)
        .await
        .map_err(DispatchError::from)?;

    let gas = response
        .as_ref()
        .and_then(|v| v.get("result"))
        .and_then(JsonValue::as_str)
        .and_then(parse_hex_u64)
        .unwrap_or(21_000);
    Ok(hex_u64(gas))
}

async fn get_logs<S: ConsensusNodeSdk + 'static>(
    services: Arc<RelayServices<S>>,
    raw_params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let filter = raw_params.first().cloned().unwrap_or(JsonValue::Object(Vec::new()));
    let address = filter.get("address").and_then(JsonValue::as_str).map(str::to_string);
    let from_block = filter.get("fromBlock").and_then(JsonValue::as_str).map(str::to_string);
    let to_block = filter.get("toBlock").and_then(JsonValue::as_str).map(str::to_string);

    let services_for_task = services.clone();
    let ctx_owned = ctx.clone();
    let logs = services
        .workers
        .run(TaskKind::GetLogs, move || async move {
            let mut path = String::from("contracts/results/logs?order=asc");
            if let Some(addr) = &address {
                path.push_str(&format!("&address={addr}"));
            }
            if let Some(from) = &from_block {
                path.push_str(&format!("&timestamp=gte:{from}"));
            }
            if let Some(to) = &to_block {
                path.push_str(&format!("&timestamp=lte:{to}"));
            }

            let pages = services_for_task
                .mirror
                .get_paginated(path, path_labels::CONTRACT_RESULTS_LOGS, "logs", &ctx_owned)
                .await
                .map_err(WorkerTaskError::from)?;

            // Immature records (no block number yet) are retried once more
            // via the single-record maturity poll before giving up (spec
            // §4.2 "Immature-record polling", §8 scenario 3).
            let mut matured = Vec::with_capacity(pages.len());
            for log in pages {
                if log.get("block_number").is_none_or(JsonValue::is_null) {
                    if let Some(tx_hash) = log.get("transaction_hash").and_then(JsonValue::as_str) {
                        let refreshed = services_for_task
                            .mirror
                            .get_contract_result_with_retry(tx_hash, &ctx_owned)
                            .await
                            .map_err(WorkerTaskError::from)?;
                        matured.push(refreshed);
                        continue;
                    }
                }
                matured.push(log);
            }
            Ok(matured)
        })
        .await
        .map_err(DispatchError::from)?;

    Ok(JsonValue::Array(logs))
}

async fn send_raw_transaction<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    raw_params: Vec<JsonValue>,
    ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let rlp_hex = params::required_str(&raw_params, 0, "transaction").map_err(DispatchError::from)?;
    let event = services.consensus.submit_raw_transaction(rlp_hex, &ctx).await?;
    if !matches!(event, relay_primitives::events::EventRecord::ExecuteTransaction(_)) {
        return Err(JsonRpcError::internal("unexpected event kind from submission client").into());
    }

    // The wire-visible transaction hash is `keccak256` of the raw signed
    // bytes, same as any other Ethereum client; the consensus-node
    // transaction id the submission client returns is Hedera-native and
    // only used for the `ETH_EXECUTION`/`EXECUTE_TRANSACTION` event.
    let bytes = alloy_primitives::hex::decode(rlp_hex.strip_prefix("0x").unwrap_or(rlp_hex))
        .map_err(|e| JsonRpcError::internal(e.to_string()))?;
    let hash = alloy_primitives::keccak256(&bytes);
    Ok(JsonValue::String(format!("0x{}", alloy_primitives::hex::encode(hash.as_slice()))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_services;

    #[tokio::test]
    async fn chain_id_returns_configured_value() {
        let services = test_services();
        let ctx = RequestContext::new("req-1", "127.0.0.1");
        let result = chain_id(services, vec![], ctx).await.unwrap();
        assert_eq!(result, JsonValue::String("0x12a".to_string()));
    }

    #[tokio::test]
    async fn accounts_is_always_empty() {
        let services = test_services();
        let ctx = RequestContext::new("req-1", "127.0.0.1");
        let result = accounts(services, vec![], ctx).await.unwrap();
        assert_eq!(result, JsonValue::Array(Vec::new()));
    }

    #[tokio::test]
    async fn get_transaction_receipt_requires_a_hash_param() {
        let services = test_services();
        let ctx = RequestContext::new("req-1", "127.0.0.1");
        let result = get_transaction_receipt(services, vec![], ctx).await;
        assert!(matches!(result, Err(DispatchError::JsonRpc(e)) if e.kind == relay_primitives::error::RelayErrorKind::InvalidParams));
    }
}
