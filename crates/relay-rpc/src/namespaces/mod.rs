//! One module per RPC namespace (spec §4.8, §6): each exposes a `register`
//! function appending its handlers to a [`crate::registry::RegistryBuilder`],
//! mirroring how the source system iterates one implementation object per
//! namespace (`eth`, `net`, `web3`, `debug`, `txpool`, `admin`).

pub mod admin;
pub mod debug;
pub mod eth;
pub mod net;
pub mod txpool;
pub mod web3;

/// Renders a `u64` as a `0x`-prefixed lowercase hex string, the convention
/// every Ethereum JSON-RPC quantity uses on the wire.
pub(crate) fn hex_u64(v: u64) -> relay_primitives::json::JsonValue {
    relay_primitives::json::JsonValue::String(format!("0x{v:x}"))
}

pub(crate) fn hex_bytes(bytes: &[u8]) -> relay_primitives::json::JsonValue {
    relay_primitives::json::JsonValue::String(format!("0x{}", alloy_primitives::hex::encode(bytes)))
}

/// Parses a `0x`-prefixed hex quantity into a `u64`, the inverse of
/// [`hex_u64`].
pub(crate) fn parse_hex_u64(raw: &str) -> Option<u64> {
    u64::from_str_radix(raw.strip_prefix("0x").unwrap_or(raw), 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_u64_round_trips() {
        let encoded = hex_u64(255);
        assert_eq!(encoded, relay_primitives::json::JsonValue::String("0xff".to_string()));
        assert_eq!(parse_hex_u64("0xff"), Some(255));
    }
}
