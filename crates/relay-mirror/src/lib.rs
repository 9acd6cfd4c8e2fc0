//! Mirror node HTTP client (spec §4.2 `C2`): retrying REST/Web3 requests,
//! pagination, accepted-error handling, and entity resolution.

pub mod accepted_errors;
pub mod client;
pub mod error;
pub mod pagination;
pub mod types;

pub use client::{EntityType, MirrorNodeClient};
pub use error::MirrorNodeClientError;
pub use types::{path_labels, HttpMethod, MirrorRequest};
