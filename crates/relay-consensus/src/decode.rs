//! Raw Ethereum transaction decoding (spec §4.6 step 1).
//!
//! Extracts only what the submission path needs — recipient, call data,
//! nonce — and nothing more; signature verification is explicitly out of
//! scope (spec §1 Non-goals).

use alloy_consensus::{Transaction, TxEnvelope};
use alloy_eips::eip2718::Decodable2718;
use alloy_primitives::{Address, Bytes};

use crate::error::RawTransactionError;

pub struct DecodedRawTransaction {
    pub sender: Address,
    pub recipient: Option<Address>,
    pub call_data: Bytes,
    pub nonce: u64,
}

/// Decodes a `0x`-prefixed RLP hex string into the fields the submission
/// path needs, recovering the sender from the transaction's own signature
/// (spec §1 Non-goals: the relay does not verify inbound signatures beyond
/// what recovery itself requires to learn the sender).
pub fn decode_raw_transaction(rlp_hex: &str) -> Result<DecodedRawTransaction, RawTransactionError> {
    let bytes = decode_hex(rlp_hex)?;
    let envelope = TxEnvelope::decode_2718(&mut bytes.as_slice())
        .map_err(|e| RawTransactionError::Decode(e.to_string()))?;
    let sender = envelope
        .recover_signer()
        .map_err(|e| RawTransactionError::Decode(e.to_string()))?;

    Ok(DecodedRawTransaction {
        sender,
        recipient: envelope.to(),
        call_data: envelope.input().clone(),
        nonce: envelope.nonce(),
    })
}

fn decode_hex(rlp_hex: &str) -> Result<Vec<u8>, RawTransactionError> {
    let trimmed = rlp_hex.strip_prefix("0x").unwrap_or(rlp_hex);
    alloy_primitives::hex::decode(trimmed).map_err(|e| RawTransactionError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_hex() {
        let result = decode_raw_transaction("0xzz");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_odd_length_hex() {
        let result = decode_raw_transaction("0xabc");
        assert!(result.is_err());
    }
}
