//! The mirror node HTTP client (spec §4.2 `C2`).
//!
//! Wraps a `reqwest::Client` with: linear backoff retry on configured status
//! codes and transport failures, an RFC 7239 `Forwarded` header carrying the
//! caller's IP, per-endpoint accepted-error handling, immature-record
//! polling for contract results/logs, and entity-type resolution across
//! accounts/contracts/tokens.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use relay_cache::RelayCache;
use relay_config::MirrorNodeConfig;
use relay_metrics::record_mirror_request;
use relay_primitives::context::RequestContext;
use relay_primitives::error::JsonRpcError;
use relay_primitives::json::JsonValue;

use crate::accepted_errors::AcceptedErrorTable;
use crate::error::MirrorNodeClientError;
use crate::pagination::paginate;
use crate::types::{path_labels, HttpMethod, MirrorRequest};

/// The kind of ledger entity a mirror-node id resolved to (spec §4.2
/// "Entity resolution").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Account,
    Contract,
    Token,
}

pub struct MirrorNodeClient {
    rest_client: reqwest::Client,
    web3_client: reqwest::Client,
    rest_base: url::Url,
    web3_base: url::Url,
    config: MirrorNodeConfig,
    accepted_errors: AcceptedErrorTable,
    cache: Arc<RelayCache>,
}

/// A contract result/log record is immature if it hasn't fully landed on
/// consensus yet (spec §4.2 "Immature-record polling").
fn is_immature(record: &JsonValue) -> bool {
    let missing_block_number = record.get("block_number").is_none_or(JsonValue::is_null);
    let missing_transaction_index =
        record.get("transaction_index").is_none_or(JsonValue::is_null);
    let zero_block_hash = record.get("block_hash").and_then(JsonValue::as_str) == Some("0x");
    missing_block_number || missing_transaction_index || zero_block_hash
}

fn forwarded_header(ip: &str) -> String {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V6(v6)) => format!("for=\"[{v6}]\""),
        Ok(IpAddr::V4(v4)) => format!("for={v4}"),
        Err(_) => format!("for=\"{ip}\""),
    }
}

impl MirrorNodeClient {
    pub fn new(config: MirrorNodeConfig, cache: Arc<RelayCache>) -> Result<Self, url::ParseError> {
        let rest_base = url::Url::parse(&config.mirror_node_url)?;
        let web3_base = url::Url::parse(&config.mirror_node_url_web3)?;
        let timeout = config.timeout();

        let build = || {
            reqwest::Client::builder()
                .timeout(timeout)
                .pool_max_idle_per_host(config.mirror_node_http_max_sockets)
        };

        let rest_client = build().build().expect("reqwest client config is valid");
        let web3_client = build().build().expect("reqwest client config is valid");
        let accepted_errors = AcceptedErrorTable::new(&config.eth_call_accepted_errors);

        Ok(Self { rest_client, web3_client, rest_base, web3_base, config, accepted_errors, cache })
    }

    /// Issues a single mirror node request, retrying per `retry_codes` and
    /// on any transport error, up to `request_retry_count` attempts.
    pub async fn request(
        &self,
        req: MirrorRequest,
        ctx: &RequestContext,
    ) -> Result<Option<JsonValue>, MirrorNodeClientError> {
        let max_attempts = req.retries.unwrap_or(self.config.mirror_node_request_retry_count);
        let backoff = ConstantBuilder::default()
            .with_delay(self.config.retry_delay())
            .with_max_times(max_attempts as usize);

        let outcome = (|| self.execute_once(&req, ctx))
            .retry(backoff)
            .when(|err: &MirrorNodeClientError| {
                self.config.mirror_node_retry_codes.contains(&err.status_code)
            })
            .await;

        match outcome {
            Ok(value) => {
                record_mirror_request(req.path_label, 200);
                Ok(Some(value))
            }
            Err(err) if self.accepted_errors.is_silent(req.path_label, err.status_code) => {
                record_mirror_request(req.path_label, err.status_code);
                Ok(None)
            }
            Err(err) => {
                record_mirror_request(req.path_label, err.status_code);
                Err(err)
            }
        }
    }

    async fn execute_once(
        &self,
        req: &MirrorRequest,
        ctx: &RequestContext,
    ) -> Result<JsonValue, MirrorNodeClientError> {
        let base = if req.path_label == path_labels::CONTRACT_CALL {
            &self.web3_base
        } else {
            &self.rest_base
        };
        let client = if req.path_label == path_labels::CONTRACT_CALL {
            &self.web3_client
        } else {
            &self.rest_client
        };
        let url = base.join(&req.path).map_err(|e| MirrorNodeClientError::transport(e.to_string()))?;

        let mut builder = match req.method {
            HttpMethod::Get => client.get(url),
            HttpMethod::Post => client.post(url),
        };
        builder = builder.header("X-Request-Id", ctx.request_id());
        if let Some(key) = &self.config.mirror_node_url_header_x_api_key {
            builder = builder.header("x-api-key", key.clone());
        }
        let forwarded_for = req.forwarded_for_ip.as_deref().unwrap_or(ctx.client_ip());
        if !forwarded_for.is_empty() {
            builder = builder.header("Forwarded", forwarded_header(forwarded_for));
        }
        if let Some(body) = &req.body {
            builder = builder.json(&body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| MirrorNodeClientError::transport(e.to_string()))?;
        let status = response.status().as_u16();

        if !response.status().is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "mirror node error body unavailable".to_string());
            return Err(MirrorNodeClientError::new(status, message));
        }

        let text = response.text().await.map_err(|e| MirrorNodeClientError::transport(e.to_string()))?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| MirrorNodeClientError::transport(e.to_string()))?;
        Ok(JsonValue::from(value))
    }

    /// Fetches every page of a list endpoint, bounded by
    /// `contract_results_pg_max` (spec §8 "Pagination cap").
    pub async fn get_paginated(
        &self,
        path: String,
        path_label: &'static str,
        property: &str,
        ctx: &RequestContext,
    ) -> Result<Vec<JsonValue>, MirrorNodeClientError> {
        let page_max = self.config.mirror_node_contract_results_pg_max;
        paginate(
            |cursor| {
                let path = cursor.unwrap_or_else(|| path.clone());
                async move { self.request(MirrorRequest::get(path, path_label), ctx).await }
            },
            property,
            page_max,
        )
        .await
    }

    /// Polls for contract results/logs that may not have reached the mirror
    /// node yet, surfacing `DEPENDENT_SERVICE_IMMATURE_RECORDS` once the
    /// configured retry budget is exhausted (spec §4.2 "Immature records").
    pub async fn get_contract_result_with_retry(
        &self,
        transaction_id: &str,
        ctx: &RequestContext,
    ) -> Result<JsonValue, JsonRpcError> {
        let path = format!("contracts/results/{transaction_id}");
        for attempt in 0..=self.config.mirror_node_request_retry_count {
            let result = self
                .request(MirrorRequest::get(path.clone(), path_labels::CONTRACT_RESULTS), ctx)
                .await
                .map_err(|e| JsonRpcError::internal(e.message))?;

            if let Some(value) = result {
                if !is_immature(&value) {
                    return Ok(value);
                }
            }
            if attempt < self.config.mirror_node_request_retry_count {
                tokio::time::sleep(self.config.retry_delay()).await;
            }
        }
        Err(JsonRpcError::dependent_service_immature_records())
    }

    /// Races account/contract/token lookups for `id` and returns whichever
    /// resolves first, caching the winning type (spec §4.2 "Entity
    /// resolution").
    pub async fn resolve_entity_type(
        &self,
        id: &str,
        ctx: &RequestContext,
    ) -> Result<Option<EntityType>, MirrorNodeClientError> {
        let cache_key = format!("entityType:{id}");
        if let Some(cached) = self.cache.main().get(&cache_key, "resolveEntityType").await {
            return Ok(match cached.as_slice() {
                b"account" => Some(EntityType::Account),
                b"contract" => Some(EntityType::Contract),
                b"token" => Some(EntityType::Token),
                _ => None,
            });
        }

        let accounts = self.request(MirrorRequest::get(format!("accounts/{id}"), path_labels::ACCOUNTS), ctx);
        let contracts =
            self.request(MirrorRequest::get(format!("contracts/{id}"), path_labels::CONTRACTS), ctx);
        let tokens = self.request(MirrorRequest::get(format!("tokens/{id}"), path_labels::TOKENS), ctx);

        let (accounts, contracts, tokens) = futures::join!(accounts, contracts, tokens);

        let resolved = if contracts.ok().flatten().is_some() {
            Some(EntityType::Contract)
        } else if tokens.ok().flatten().is_some() {
            Some(EntityType::Token)
        } else if accounts.ok().flatten().is_some() {
            Some(EntityType::Account)
        } else {
            None
        };

        if let Some(kind) = resolved {
            let bytes = match kind {
                EntityType::Account => b"account".to_vec(),
                EntityType::Contract => b"contract".to_vec(),
                EntityType::Token => b"token".to_vec(),
            };
            self.cache.main().set(&cache_key, bytes, relay_cache::Ttl::Default, "resolveEntityType").await;
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_header_brackets_ipv6() {
        assert_eq!(forwarded_header("::1"), "for=\"[::1]\"");
        assert_eq!(forwarded_header("203.0.113.4"), "for=203.0.113.4");
    }

    #[test]
    fn record_with_zero_block_hash_is_immature() {
        use relay_primitives::json::BigNumber;
        let record = JsonValue::Object(vec![
            ("block_number".to_string(), JsonValue::Number(BigNumber::from_u64(5))),
            ("transaction_index".to_string(), JsonValue::Number(BigNumber::from_u64(0))),
            ("block_hash".to_string(), JsonValue::String("0x".to_string())),
        ]);
        assert!(is_immature(&record));
    }

    #[test]
    fn fully_populated_record_is_mature() {
        use relay_primitives::json::BigNumber;
        let record = JsonValue::Object(vec![
            ("block_number".to_string(), JsonValue::Number(BigNumber::from_u64(5))),
            ("transaction_index".to_string(), JsonValue::Number(BigNumber::from_u64(0))),
            ("block_hash".to_string(), JsonValue::String("0xabc".to_string())),
        ]);
        assert!(!is_immature(&record));
    }
}
