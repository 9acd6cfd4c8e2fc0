//! Shared types for the relay: request context, dynamic JSON values, and the
//! error taxonomy that every other `relay-*` crate maps into.

pub mod context;
pub mod error;
pub mod events;
pub mod json;

pub use context::RequestContext;
pub use error::{RelayErrorKind, RpcErrorCode};
pub use events::EventRecord;
pub use json::JsonValue;
