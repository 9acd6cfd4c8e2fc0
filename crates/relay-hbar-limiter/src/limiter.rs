//! The HBAR spending/limit service (spec §4.5 `C5`).

use std::time::{Duration, Instant};

use dashmap::DashMap;
use relay_primitives::context::RequestContext;

use crate::plan::{RequestMode, SpendingPlan};

const DEFAULT_PLAN_ID: &str = "default";

struct SpendAccount {
    spent_tinybars: u64,
    window_start: Instant,
}

/// Per-plan rolling-window spend accounting plus the evm-address/ip-address
/// binding table used to resolve a caller to a plan (spec §4.5 "Binding
/// order": explicit evm-address, then ip-address, then the default plan).
pub struct HbarSpendingLimiter {
    plans: DashMap<String, SpendingPlan>,
    evm_bindings: DashMap<String, String>,
    ip_bindings: DashMap<String, String>,
    accounts: DashMap<String, SpendAccount>,
    default_window: Duration,
}

impl HbarSpendingLimiter {
    pub fn new(default_plan_limit_tinybars: u64, default_window: Duration) -> Self {
        let plans = DashMap::new();
        plans.insert(
            DEFAULT_PLAN_ID.to_string(),
            SpendingPlan::new(DEFAULT_PLAN_ID, default_plan_limit_tinybars, default_window),
        );
        Self {
            plans,
            evm_bindings: DashMap::new(),
            ip_bindings: DashMap::new(),
            accounts: DashMap::new(),
            default_window,
        }
    }

    pub fn register_plan(&self, plan: SpendingPlan) {
        self.plans.insert(plan.plan_id.clone(), plan);
    }

    pub fn bind_evm_address(&self, evm_address: &str, plan_id: &str) {
        self.evm_bindings.insert(evm_address.to_lowercase(), plan_id.to_string());
    }

    pub fn bind_ip_address(&self, ip_address: &str, plan_id: &str) {
        self.ip_bindings.insert(ip_address.to_string(), plan_id.to_string());
    }

    fn resolve_plan_id(&self, evm_address: Option<&str>, ip_address: Option<&str>) -> String {
        if let Some(addr) = evm_address {
            if let Some(plan_id) = self.evm_bindings.get(&addr.to_lowercase()) {
                return plan_id.clone();
            }
        }
        if let Some(ip) = ip_address {
            if let Some(plan_id) = self.ip_bindings.get(ip) {
                return plan_id.clone();
            }
        }
        DEFAULT_PLAN_ID.to_string()
    }

    /// Returns `true` if executing a request costing `estimated_fee_tinybars`
    /// would push the caller's plan over its limit within the current
    /// window.
    pub fn should_limit(
        &self,
        _mode: RequestMode,
        evm_address: Option<&str>,
        _tx_kind: &str,
        _original_caller_address: Option<&str>,
        ctx: &RequestContext,
        estimated_fee_tinybars: Option<u64>,
    ) -> bool {
        let plan_id = self.resolve_plan_id(evm_address, Some(ctx.client_ip()));
        let Some(plan) = self.plans.get(&plan_id) else { return false };
        let estimate = estimated_fee_tinybars.unwrap_or(0);

        let mut account = self.accounts.entry(plan_id.clone()).or_insert_with(|| SpendAccount {
            spent_tinybars: 0,
            window_start: Instant::now(),
        });
        self.roll_window_if_expired(&mut account, plan.window);

        account.spent_tinybars.saturating_add(estimate) > plan.limit_tinybars
    }

    /// Records actually-executed spend against the caller's plan (spec
    /// §4.5 "Accounting aggregates executed executionCost").
    pub fn record_spend(
        &self,
        evm_address: Option<&str>,
        ip_address: Option<&str>,
        tinybars: u64,
    ) {
        let plan_id = self.resolve_plan_id(evm_address, ip_address);
        let window = self
            .plans
            .get(&plan_id)
            .map_or(self.default_window, |plan| plan.window);

        let mut account = self
            .accounts
            .entry(plan_id.clone())
            .or_insert_with(|| SpendAccount { spent_tinybars: 0, window_start: Instant::now() });
        self.roll_window_if_expired(&mut account, window);
        account.spent_tinybars = account.spent_tinybars.saturating_add(tinybars);

        relay_metrics::record_hbar_spend(&plan_id, tinybars);
    }

    fn roll_window_if_expired(&self, account: &mut SpendAccount, window: Duration) {
        if account.window_start.elapsed() >= window {
            account.spent_tinybars = 0;
            account.window_start = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RequestContext {
        RequestContext::new("req-1", "10.0.0.1")
    }

    #[test]
    fn default_plan_is_used_without_bindings() {
        let limiter = HbarSpendingLimiter::new(1000, Duration::from_secs(60));
        assert!(!limiter.should_limit(
            RequestMode::Transaction,
            Some("0xabc"),
            "ETH_SEND_RAW_TRANSACTION",
            None,
            &ctx(),
            Some(500),
        ));
    }

    #[test]
    fn evm_address_binding_takes_priority_over_ip() {
        let limiter = HbarSpendingLimiter::new(1000, Duration::from_secs(60));
        limiter.register_plan(SpendingPlan::new("tight", 100, Duration::from_secs(60)));
        limiter.bind_evm_address("0xabc", "tight");
        limiter.bind_ip_address("10.0.0.1", "default");

        assert!(limiter.should_limit(
            RequestMode::Transaction,
            Some("0xabc"),
            "ETH_SEND_RAW_TRANSACTION",
            None,
            &ctx(),
            Some(200),
        ));
    }

    #[test]
    fn spend_accumulates_within_window_and_trips_limit() {
        let limiter = HbarSpendingLimiter::new(1000, Duration::from_secs(60));
        limiter.record_spend(Some("0xabc"), None, 600);
        limiter.record_spend(Some("0xabc"), None, 300);

        assert!(limiter.should_limit(
            RequestMode::Transaction,
            Some("0xabc"),
            "ETH_SEND_RAW_TRANSACTION",
            None,
            &ctx(),
            Some(200),
        ));
    }

    #[test]
    fn window_rollover_resets_spend() {
        let limiter = HbarSpendingLimiter::new(1000, Duration::from_millis(20));
        limiter.record_spend(Some("0xabc"), None, 900);
        std::thread::sleep(Duration::from_millis(30));

        assert!(!limiter.should_limit(
            RequestMode::Transaction,
            Some("0xabc"),
            "ETH_SEND_RAW_TRANSACTION",
            None,
            &ctx(),
            Some(500),
        ));
    }
}
