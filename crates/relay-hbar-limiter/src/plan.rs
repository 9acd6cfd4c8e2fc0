//! Spending plans and the binding table that resolves a caller to one
//! (spec §3 `SpendingPlan`, §4.5 "Binding order").

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SpendingPlan {
    pub plan_id: String,
    pub limit_tinybars: u64,
    pub window: Duration,
}

impl SpendingPlan {
    pub fn new(plan_id: impl Into<String>, limit_tinybars: u64, window: Duration) -> Self {
        Self { plan_id: plan_id.into(), limit_tinybars, window }
    }
}

/// The kind of caller-identifying request this check is guarding (spec §9
/// glossary "mode"): a read-only query vs. a state-changing transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Query,
    Transaction,
}
