//! `txpool_*` namespace (spec §4.3, §6).
//!
//! [`relay_txpool::PendingTransactionPoolService`] deliberately stores raw
//! RLP payloads and never parses them; this module does the RLP decode and
//! the pending/queued-by-nonce regrouping an Ethereum client's `txpool`
//! namespace exposes, using the same decoder the submission path uses
//! (spec §4.6 step 1). Every entry currently stored counts as `pending` —
//! the pool has no notion of a nonce gap, so `queued` is always empty.

use std::sync::Arc;

use alloy_primitives::Address;
use relay_consensus::decode::decode_raw_transaction;
use relay_consensus::ConsensusNodeSdk;
use relay_primitives::context::RequestContext;
use relay_primitives::json::JsonValue;

use crate::error::DispatchError;
use crate::registry::RegistryBuilder;
use crate::services::RelayServices;

pub fn register<S: ConsensusNodeSdk + 'static>(builder: &mut RegistryBuilder<S>) {
    builder.register("txpool", "status", status);
    builder.register("txpool", "content", content);
    builder.register("txpool", "inspect", inspect);
}

async fn status<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let payloads = services.txpool.get_all_transactions().await?;
    Ok(JsonValue::Object(vec![
        ("pending".to_string(), super::hex_u64(payloads.len() as u64)),
        ("queued".to_string(), super::hex_u64(0)),
    ]))
}

async fn content<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let pending = group_by_sender(services, |sender, nonce, hash, decoded| {
        (
            nonce,
            JsonValue::Object(vec![
                ("hash".to_string(), super::hex_bytes(hash.as_slice())),
                ("from".to_string(), JsonValue::String(format!("{sender:#x}"))),
                (
                    "to".to_string(),
                    decoded
                        .recipient
                        .map(|a| JsonValue::String(format!("{a:#x}")))
                        .unwrap_or(JsonValue::Null),
                ),
                ("nonce".to_string(), super::hex_u64(decoded.nonce)),
                ("input".to_string(), super::hex_bytes(&decoded.call_data)),
            ]),
        )
    })
    .await?;

    Ok(JsonValue::Object(vec![
        ("pending".to_string(), pending),
        ("queued".to_string(), JsonValue::Object(Vec::new())),
    ]))
}

async fn inspect<S: ConsensusNodeSdk>(
    services: Arc<RelayServices<S>>,
    _params: Vec<JsonValue>,
    _ctx: RequestContext,
) -> Result<JsonValue, DispatchError> {
    let pending = group_by_sender(services, |_sender, nonce, _hash, decoded| {
        let to = decoded.recipient.map(|a| format!("{a:#x}")).unwrap_or_else(|| "contract creation".to_string());
        (nonce, JsonValue::String(format!("{to}: {} wei data", decoded.call_data.len())))
    })
    .await?;

    Ok(JsonValue::Object(vec![
        ("pending".to_string(), pending),
        ("queued".to_string(), JsonValue::Object(Vec::new())),
    ]))
}

/// Decodes every stored payload, groups the results by sender address, and
/// lets the caller render each entry under its hex nonce key.
async fn group_by_sender<S, F>(
    services: Arc<RelayServices<S>>,
    mut render: F,
) -> Result<JsonValue, DispatchError>
where
    S: ConsensusNodeSdk,
    F: FnMut(Address, String, alloy_primitives::B256, &relay_consensus::decode::DecodedRawTransaction) -> (String, JsonValue),
{
    let payloads = services.txpool.get_all_transactions().await?;
    let mut by_sender: Vec<(Address, Vec<(String, JsonValue)>)> = Vec::new();

    for rlp_hex in payloads {
        let Ok(decoded) = decode_raw_transaction(&rlp_hex) else { continue };
        let Ok(raw_bytes) =
            alloy_primitives::hex::decode(rlp_hex.strip_prefix("0x").unwrap_or(&rlp_hex))
        else {
            continue;
        };
        let hash = alloy_primitives::keccak256(&raw_bytes);
        let nonce_key = format!("0x{:x}", decoded.nonce);
        let (key, value) = render(decoded.sender, nonce_key, hash, &decoded);

        match by_sender.iter_mut().find(|(addr, _)| *addr == decoded.sender) {
            Some((_, entries)) => entries.push((key, value)),
            None => by_sender.push((decoded.sender, vec![(key, value)])),
        }
    }

    Ok(JsonValue::Object(
        by_sender
            .into_iter()
            .map(|(addr, entries)| (format!("{addr:#x}"), JsonValue::Object(entries)))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_services;

    #[tokio::test]
    async fn status_reports_zero_when_pool_is_empty() {
        let services = test_services();
        let result = status(services, vec![], RequestContext::new("r", "127.0.0.1")).await.unwrap();
        assert_eq!(result.get("pending").unwrap(), &super::super::hex_u64(0));
    }

    #[tokio::test]
    async fn content_has_empty_queued_section() {
        let services = test_services();
        let result = content(services, vec![], RequestContext::new("r", "127.0.0.1")).await.unwrap();
        assert_eq!(result.get("queued").unwrap(), &JsonValue::Object(Vec::new()));
    }
}
