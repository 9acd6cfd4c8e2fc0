//! Mirror node client error type (spec §3 `MirrorResponse<T>`, §7).

use relay_primitives::json::JsonValue;

/// A fallback status used when a transport error carries no HTTP status at
/// all (spec §4.2 "A fallback 'unknown server error' status (567)").
pub const UNKNOWN_SERVER_ERROR_STATUS: u16 = 567;

#[derive(Debug, Clone, thiserror::Error)]
#[error("mirror node request failed with status {status_code}: {message}")]
pub struct MirrorNodeClientError {
    pub status_code: u16,
    pub message: String,
    pub detail: Option<String>,
    pub data: Option<JsonValue>,
}

impl MirrorNodeClientError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self { status_code, message: message.into(), detail: None, data: None }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(UNKNOWN_SERVER_ERROR_STATUS, message)
    }

    pub fn is_accepted_status(&self, accepted: &[u16]) -> bool {
        accepted.contains(&self.status_code)
    }
}
