//! Dynamic JSON value with precision-preserving numbers.
//!
//! Mirror responses and RPC params are "any" JSON in the source system; here
//! that becomes a closed sum type instead of a dynamic language value.
//! Numbers are kept as the raw decimal text plus a lazily-computed `f64` so
//! that values beyond 2^53 (routine for Hedera tinybar/wei amounts) never
//! lose precision silently.

use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// A JSON number represented without loss of precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BigNumber(serde_json::Number);

impl BigNumber {
    pub fn from_u64(v: u64) -> Self {
        Self(serde_json::Number::from(v))
    }

    pub fn from_u256(v: U256) -> Self {
        // U256 can exceed what serde_json::Number can hold natively even with
        // arbitrary_precision, so round-trip through its decimal string.
        Self(serde_json::from_str(&v.to_string()).expect("U256 decimal string is a valid number"))
    }

    /// Parses a raw numeric literal (as found in mirror-node JSON) without
    /// going through a lossy float intermediate.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw).map(Self)
    }

    pub fn as_u256(&self) -> Option<U256> {
        U256::from_str_radix(self.0.as_str(), 10).ok()
    }

    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(f64::NAN)
    }

    pub fn raw(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed sum type standing in for the source system's dynamic JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(BigNumber),
    String(String),
    Array(Vec<JsonValue>),
    Object(Vec<(String, JsonValue)>),
}

impl JsonValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&BigNumber> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        match self {
            Self::Object(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Converts a [`serde_json::Value`] parsed with the `arbitrary_precision`
/// feature into our closed sum type, preserving every number's raw digits.
impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(BigNumber(n)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, JsonValue::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_numbers_beyond_2_pow_53() {
        // 2^53 + 1, the smallest integer an f64 cannot represent exactly.
        let raw = "9007199254740993";
        let parsed: serde_json::Value =
            serde_json::from_str(&format!(r#"{{"v":{raw}}}"#)).unwrap();
        let value = JsonValue::from(parsed);
        let v = value.get("v").unwrap().as_number().unwrap();
        assert_eq!(v.raw(), raw);
    }

    #[test]
    fn big_number_round_trips_through_u256() {
        let u = U256::from(123_456_789_012_345_u64);
        let big = BigNumber::from_u256(u);
        assert_eq!(big.as_u256(), Some(u));
    }
}
