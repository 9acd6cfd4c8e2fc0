//! Worker pool (spec §4.7 `C7`): offloads CPU-heavy decode/aggregation
//! tasks, carrying typed errors across the boundary.

pub mod error;
pub mod pool;
pub mod task;

pub use error::{unwrap_error, wrap_error, WorkerTaskError};
pub use pool::WorkerPool;
pub use task::TaskKind;
