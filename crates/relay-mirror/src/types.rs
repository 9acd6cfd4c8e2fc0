//! Mirror request/response shapes (spec §3).

use relay_primitives::json::JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A single mirror node call. `path_label` is the *templated* path
/// (placeholders like `{address}`/`{timestamp}` removed) used both as the
/// metrics label and as the key into the accepted-error table.
#[derive(Debug, Clone)]
pub struct MirrorRequest {
    pub method: HttpMethod,
    pub path: String,
    pub path_label: &'static str,
    pub body: Option<JsonValue>,
    pub retries: Option<u32>,
    pub forwarded_for_ip: Option<String>,
}

impl MirrorRequest {
    pub fn get(path: impl Into<String>, path_label: &'static str) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            path_label,
            body: None,
            retries: None,
            forwarded_for_ip: None,
        }
    }

    pub fn post(path: impl Into<String>, path_label: &'static str, body: JsonValue) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            path_label,
            body: Some(body),
            retries: None,
            forwarded_for_ip: None,
        }
    }

    #[must_use]
    pub fn with_forwarded_for(mut self, ip: impl Into<String>) -> Self {
        self.forwarded_for_ip = Some(ip.into());
        self
    }

    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }
}

/// Path label constants for the endpoints named in spec §6.
pub mod path_labels {
    pub const ACCOUNTS: &str = "accounts/{id}";
    pub const BLOCKS_BY_ID: &str = "blocks/{id}";
    pub const BLOCKS: &str = "blocks";
    pub const CONTRACTS: &str = "contracts/{id}";
    pub const CONTRACT_RESULTS: &str = "contracts/results";
    pub const CONTRACT_RESULTS_LOGS: &str = "contracts/results/logs";
    pub const CONTRACT_RESULT_ACTIONS: &str = "contracts/results/{id}/actions";
    pub const CONTRACT_RESULT_OPCODES: &str = "contracts/results/{id}/opcodes";
    pub const NETWORK_FEES: &str = "network/fees";
    pub const NETWORK_EXCHANGE_RATE: &str = "network/exchangerate";
    pub const TOKENS: &str = "tokens/{id}";
    pub const TRANSACTIONS: &str = "transactions/{id}";
    pub const CONTRACT_STATE: &str = "contracts/{address}/state";
    pub const CONTRACT_CALL: &str = "contracts/call";
}
