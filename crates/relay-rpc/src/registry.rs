//! Method registry (spec §4.8 "Registry").
//!
//! Built once at startup: every handler across the `eth`/`net`/`web3`/
//! `debug`/`txpool`/`admin` namespaces is registered under its full
//! `"<namespace>_<method>"` name. The source system discovers these via a
//! `@rpcMethod` decorator scanning implementation objects at runtime; here
//! the table is assembled explicitly in `Registry::build` (spec §9 redesign
//! flag: decorator-driven discovery replaced by an explicit table).

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use relay_consensus::ConsensusNodeSdk;
use relay_primitives::context::RequestContext;
use relay_primitives::json::JsonValue;

use crate::error::DispatchError;
use crate::services::RelayServices;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A bound handler: takes the shared service bundle, the raw positional
/// params, and the request context, and returns a JSON result or a typed
/// error (spec §4.8 dispatcher contract).
pub type HandlerFn<S> = Arc<
    dyn Fn(Arc<RelayServices<S>>, Vec<JsonValue>, RequestContext) -> BoxFuture<'static, Result<JsonValue, DispatchError>>
        + Send
        + Sync,
>;

/// One entry in the registry: the full dispatch name, the bound handler,
/// and the bare method name kept alongside it for metric labelling (spec §3
/// `DispatchEntry`, §4.8 "The bound callable preserves the original method
/// name for metric labelling").
#[derive(Clone)]
pub struct DispatchEntry<S> {
    pub full_name: &'static str,
    pub method_name: &'static str,
    pub handler: HandlerFn<S>,
}

pub struct Registry<S> {
    entries: HashMap<&'static str, DispatchEntry<S>>,
}

impl<S: ConsensusNodeSdk + 'static> Registry<S> {
    pub fn lookup(&self, full_name: &str) -> Option<&DispatchEntry<S>> {
        self.entries.get(full_name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builds the registry by registering every namespace module's handler
/// table. Each namespace module exposes a `register` function that appends
/// its entries, mirroring how the source system iterates one implementation
/// object per namespace.
pub struct RegistryBuilder<S> {
    entries: HashMap<&'static str, DispatchEntry<S>>,
}

impl<S: ConsensusNodeSdk + 'static> RegistryBuilder<S> {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Registers one handler under `namespace_method`. Panics on duplicate
    /// registration — a programmer error caught at startup, never at
    /// request time.
    pub fn register<F, Fut>(&mut self, namespace: &'static str, method: &'static str, handler: F)
    where
        F: Fn(Arc<RelayServices<S>>, Vec<JsonValue>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<JsonValue, DispatchError>> + Send + 'static,
    {
        let full_name: &'static str = Box::leak(format!("{namespace}_{method}").into_boxed_str());
        let wrapped: HandlerFn<S> = Arc::new(move |services, params, ctx| Box::pin(handler(services, params, ctx)));
        let entry = DispatchEntry { full_name, method_name: method, handler: wrapped };
        if self.entries.insert(full_name, entry).is_some() {
            panic!("duplicate RPC method registration for {full_name}");
        }
    }

    pub fn build(self) -> Registry<S> {
        Registry { entries: self.entries }
    }
}

impl<S: ConsensusNodeSdk + 'static> Default for RegistryBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_registry<S: ConsensusNodeSdk + 'static>() -> Registry<S> {
    let mut builder = RegistryBuilder::new();
    crate::namespaces::eth::register(&mut builder);
    crate::namespaces::net::register(&mut builder);
    crate::namespaces::web3::register(&mut builder);
    crate::namespaces::debug::register(&mut builder);
    crate::namespaces::txpool::register(&mut builder);
    crate::namespaces::admin::register(&mut builder);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::NoopSdk;

    #[test]
    fn builds_a_non_empty_registry_with_every_namespace() {
        let registry = build_registry::<NoopSdk>();
        assert!(registry.lookup("eth_chainId").is_some());
        assert!(registry.lookup("net_version").is_some());
        assert!(registry.lookup("web3_clientVersion").is_some());
        assert!(registry.lookup("txpool_status").is_some());
        assert!(registry.lookup("admin_config").is_some());
        assert!(registry.lookup("debug_traceTransaction").is_some());
        assert!(registry.lookup("eth_bogus").is_none());
        assert!(registry.len() > 10);
    }
}
