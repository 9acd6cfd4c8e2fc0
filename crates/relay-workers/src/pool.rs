//! The bounded worker pool (spec §4.7 `C7`).
//!
//! Tasks here fetch pages from the mirror node (I/O) and then decode/
//! aggregate them (CPU), so a single `spawn_blocking` job can't host them —
//! blocking it for the duration of a network call would starve the blocking
//! pool for no reason. Instead each task is a plain `tokio::spawn`, and the
//! "pool" is the bound on *concurrent* tasks: a semaphore sized to
//! `WORKERS_POOL_MAX_THREADS` so the relay never has more than that many
//! getBlock/getBlockReceipts/getLogs jobs in flight at once, mirroring a
//! fixed-size thread pool's ceiling without actually needing dedicated
//! threads. `WORKERS_POOL_MIN_THREADS` has no separate meaning here (tokio's
//! task scheduler is already warm); it is accepted for configuration-surface
//! parity with spec §6 and otherwise unused.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use relay_metrics::{record_queue_wait, record_task_completed, record_task_duration, set_active_threads, set_queue_size, set_utilization};
use tokio::sync::Semaphore;

use crate::error::WorkerTaskError;
use crate::task::TaskKind;

pub struct WorkerPool {
    permits: Arc<Semaphore>,
    max_threads: usize,
    active: Arc<AtomicUsize>,
    queued: Arc<AtomicUsize>,
}

impl WorkerPool {
    pub fn new(max_threads: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_threads.max(1))),
            max_threads: max_threads.max(1),
            active: Arc::new(AtomicUsize::new(0)),
            queued: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Scheduling is submission order among waiters on the same semaphore
    /// (spec §4.7 "Scheduling model": "tasks are picked up in submission
    /// order by any free worker").
    pub async fn run<F, Fut, T>(&self, kind: TaskKind, task: F) -> Result<T, WorkerTaskError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, WorkerTaskError>> + Send + 'static,
        T: Send + 'static,
    {
        self.queued.fetch_add(1, Ordering::SeqCst);
        set_queue_size(self.queued.load(Ordering::SeqCst));
        let queued_since = Instant::now();

        let permit = self.permits.clone().acquire_owned().await.expect("semaphore is never closed");

        self.queued.fetch_sub(1, Ordering::SeqCst);
        record_queue_wait(queued_since.elapsed());
        set_queue_size(self.queued.load(Ordering::SeqCst));

        self.active.fetch_add(1, Ordering::SeqCst);
        set_active_threads(self.active.load(Ordering::SeqCst));
        set_utilization(self.active.load(Ordering::SeqCst) as f64 / self.max_threads as f64);

        let started = Instant::now();
        let join_result = tokio::spawn(task()).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        set_active_threads(self.active.load(Ordering::SeqCst));
        set_utilization(self.active.load(Ordering::SeqCst) as f64 / self.max_threads as f64);
        drop(permit);

        record_task_duration(kind.label(), started.elapsed());

        let result = match join_result {
            Ok(result) => result,
            Err(join_err) => Err(WorkerTaskError::Internal(format!("worker task panicked: {join_err}"))),
        };

        record_task_completed(kind.label(), if result.is_ok() { "success" } else { "failure" });
        result
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_a_task_and_returns_its_result() {
        let pool = WorkerPool::new(4);
        let result = pool.run(TaskKind::GetBlock, || async { Ok::<_, WorkerTaskError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn propagates_task_errors() {
        let pool = WorkerPool::new(4);
        let result: Result<i32, _> = pool
            .run(TaskKind::GetLogs, || async { Err(WorkerTaskError::Internal("boom".to_string())) })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn bounds_concurrency_to_max_threads() {
        use std::sync::atomic::AtomicUsize as Gauge;
        let pool = Arc::new(WorkerPool::new(2));
        let concurrent = Arc::new(Gauge::new(0));
        let max_observed = Arc::new(Gauge::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            let concurrent = concurrent.clone();
            let max_observed = max_observed.clone();
            handles.push(tokio::spawn(async move {
                pool.run(TaskKind::GetBlockReceipts, move || async move {
                    let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                    max_observed.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    concurrent.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, WorkerTaskError>(())
                })
                .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(max_observed.load(Ordering::SeqCst) <= 2);
    }
}
