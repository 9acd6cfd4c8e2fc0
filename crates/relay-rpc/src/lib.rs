//! The registry and dispatcher (spec §4.8 `C8`): wires every RPC namespace
//! up to the rest of the relay's components through a single
//! [`services::RelayServices`] bundle.

pub mod dispatcher;
pub mod error;
pub mod namespaces;
pub mod params;
pub mod registry;
pub mod services;

#[cfg(test)]
mod test_support;

pub use dispatcher::dispatch;
pub use error::DispatchError;
pub use registry::{build_registry, Registry, RegistryBuilder};
pub use services::RelayServices;
