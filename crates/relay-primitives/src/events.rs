//! Event records emitted for metrics sinks (spec §3 `EventRecord`).

use crate::context::RequestContext;

/// One of the three event kinds the relay emits for downstream metrics
/// consumers. Carried as data, not as a callback, so producers stay
/// decoupled from whatever subscribes (spec §9 redesign flag on cyclic
/// event-emitter references).
#[derive(Debug, Clone)]
pub enum EventRecord {
    EthExecution(EthExecutionEvent),
    ExecuteQuery(ExecuteQueryEvent),
    ExecuteTransaction(ExecuteTransactionEvent),
}

#[derive(Debug, Clone)]
pub struct EthExecutionEvent {
    pub method: String,
    pub sender: Option<String>,
    pub status: ExecutionStatus,
    pub ctx: RequestContext,
}

#[derive(Debug, Clone)]
pub struct ExecuteQueryEvent {
    pub method: String,
    pub cost_tinybars: u64,
    pub ctx: RequestContext,
}

#[derive(Debug, Clone)]
pub struct ExecuteTransactionEvent {
    pub transaction_id: String,
    pub tx_kind: String,
    pub operator_id: String,
    pub original_caller: String,
    pub gas_used: Option<u64>,
    pub ctx: RequestContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failure,
}
