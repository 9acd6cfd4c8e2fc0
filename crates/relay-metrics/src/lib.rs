//! Metric descriptions and update helpers, in the "describe once at startup,
//! update through a handle at the call site" style of `reth-metrics`.
//!
//! Names are taken directly from spec.md §4.7/§5/§C5 — nothing invented.

use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// Registers descriptions for every metric the relay emits. Call once at
/// startup before the exporter is installed.
pub fn describe() {
    describe_counter!("rpc_method_calls", "Total RPC calls per method and status");
    describe_counter!("cache_calls", "Cache operations per calling method, cache type, and op");
    describe_counter!("mirror_requests", "Mirror node HTTP requests per path label and status");
    describe_histogram!("task_duration", "Worker task duration in seconds");
    describe_counter!("tasks_completed", "Worker tasks completed per status");
    describe_histogram!("queue_wait", "Time a worker task waited in queue, in seconds");
    describe_gauge!("utilization", "Fraction of worker pool capacity in use");
    describe_gauge!("active_threads", "Number of worker pool threads currently busy");
    describe_gauge!("queue_size", "Number of worker tasks waiting to run");
    describe_counter!("hbar_spending_total", "Tinybars spent per spending plan");
    describe_counter!("eth_execution", "eth_ execution events per method and status");
}

pub fn record_rpc_call(method: &str, status: &'static str) {
    counter!("rpc_method_calls", "method" => method.to_string(), "status" => status).increment(1);
}

pub fn record_cache_call(calling_method: &str, cache_type: &'static str, method: &'static str) {
    counter!(
        "cache_calls",
        "callingMethod" => calling_method.to_string(),
        "cacheType" => cache_type,
        "method" => method,
    )
    .increment(1);
}

pub fn record_mirror_request(path_label: &str, status: u16) {
    counter!("mirror_requests", "pathLabel" => path_label.to_string(), "status" => status.to_string())
        .increment(1);
}

pub fn record_task_duration(task_type: &'static str, duration: Duration) {
    histogram!("task_duration", "type" => task_type).record(duration.as_secs_f64());
}

pub fn record_task_completed(task_type: &'static str, status: &'static str) {
    counter!("tasks_completed", "type" => task_type, "status" => status).increment(1);
}

pub fn record_queue_wait(duration: Duration) {
    histogram!("queue_wait").record(duration.as_secs_f64());
}

pub fn set_utilization(fraction: f64) {
    gauge!("utilization").set(fraction);
}

pub fn set_active_threads(count: usize) {
    gauge!("active_threads").set(count as f64);
}

pub fn set_queue_size(count: usize) {
    gauge!("queue_size").set(count as f64);
}

pub fn record_hbar_spend(plan_id: &str, tinybars: u64) {
    counter!("hbar_spending_total", "planId" => plan_id.to_string()).increment(tinybars);
}

pub fn record_eth_execution(method: &str, status: &'static str) {
    counter!("eth_execution", "method" => method.to_string(), "status" => status).increment(1);
}
