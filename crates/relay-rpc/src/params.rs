//! Positional-parameter extraction helpers.
//!
//! Source-system handlers destructure the raw JSON-RPC `params` array by
//! hand; the default argument rearranger appends `ctx` last (spec §4.8
//! step 2). These helpers do the same destructuring against our closed
//! [`JsonValue`] sum type instead of a dynamic language value.

use relay_primitives::error::JsonRpcError;
use relay_primitives::json::JsonValue;

pub fn required<'a>(params: &'a [JsonValue], index: usize, name: &str) -> Result<&'a JsonValue, JsonRpcError> {
    params.get(index).ok_or_else(|| {
        JsonRpcError::new(
            relay_primitives::error::RelayErrorKind::InvalidParams,
            format!("missing required parameter `{name}` at position {index}"),
        )
    })
}

pub fn required_str<'a>(params: &'a [JsonValue], index: usize, name: &str) -> Result<&'a str, JsonRpcError> {
    required(params, index, name)?.as_str().ok_or_else(|| invalid(name, "string"))
}

pub fn optional_str<'a>(params: &'a [JsonValue], index: usize) -> Option<&'a str> {
    params.get(index).and_then(JsonValue::as_str)
}

pub fn optional_bool(params: &[JsonValue], index: usize) -> bool {
    matches!(params.get(index), Some(JsonValue::Bool(true)))
}

pub fn required_array<'a>(
    params: &'a [JsonValue],
    index: usize,
    name: &str,
) -> Result<&'a [JsonValue], JsonRpcError> {
    required(params, index, name)?.as_array().ok_or_else(|| invalid(name, "array"))
}

pub fn optional_object<'a>(params: &'a [JsonValue], index: usize) -> Option<&'a JsonValue> {
    params.get(index).filter(|v| matches!(v, JsonValue::Object(_)))
}

fn invalid(name: &str, expected: &str) -> JsonRpcError {
    JsonRpcError::new(
        relay_primitives::error::RelayErrorKind::InvalidParams,
        format!("parameter `{name}` must be a {expected}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_param_is_invalid_params() {
        let err = required_str(&[], 0, "address").unwrap_err();
        assert_eq!(err.kind, relay_primitives::error::RelayErrorKind::InvalidParams);
    }

    #[test]
    fn optional_bool_defaults_false() {
        assert!(!optional_bool(&[JsonValue::String("x".into())], 1));
    }
}
