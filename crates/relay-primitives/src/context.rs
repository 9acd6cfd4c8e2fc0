//! Request-scoped context threaded through every component call.

use rand::Rng;

/// Identifies the caller and in-flight request across every suspension point
/// (cache, mirror, worker dispatch, lock, SDK submission).
///
/// Immutable once created; cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: String,
    client_ip: String,
    connection_id: Option<String>,
}

impl RequestContext {
    /// Creates a context with an explicit request id.
    pub fn new(request_id: impl Into<String>, client_ip: impl Into<String>) -> Self {
        Self { request_id: request_id.into(), client_ip: client_ip.into(), connection_id: None }
    }

    /// Creates a context for a caller that did not supply a request id,
    /// generating an opaque 32-hex-character one.
    pub fn generated(client_ip: impl Into<String>) -> Self {
        Self::new(generate_request_id(), client_ip)
    }

    #[must_use]
    pub fn with_connection_id(mut self, connection_id: impl Into<String>) -> Self {
        self.connection_id = Some(connection_id.into());
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn client_ip(&self) -> &str {
        &self.client_ip
    }

    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }
}

impl std::fmt::Display for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Request ID: {}, IP: {}]", self.request_id, self.client_ip)
    }
}

/// Not parsed anywhere, only logged and echoed back to the caller, so a
/// plain random hex string is used instead of pulling in a UUID crate.
fn generate_request_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_32_hex_chars_and_unique() {
        let a = RequestContext::generated("127.0.0.1");
        let b = RequestContext::generated("127.0.0.1");
        assert_eq!(a.request_id().len(), 32);
        assert!(a.request_id().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a.request_id(), b.request_id());
    }

    #[test]
    fn display_includes_request_id_and_ip() {
        let ctx = RequestContext::new("req-1", "10.0.0.1");
        assert_eq!(ctx.to_string(), "[Request ID: req-1, IP: 10.0.0.1]");
    }
}
