//! HBAR spending/limit service (spec §4.5 `C5`).

pub mod limiter;
pub mod plan;

pub use limiter::HbarSpendingLimiter;
pub use plan::{RequestMode, SpendingPlan};
