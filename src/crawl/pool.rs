// src/crawl/pool.rs
// =============================================================================
// A fixed-size worker pool on top of tokio tasks.
//
// Every submitted job becomes a tokio task that first waits for one of N
// semaphore permits, so at most N jobs run at once and the rest queue up.
// All tasks live in a JoinSet, which gives us the two ways of stopping:
//
// - shutdown(): stop accepting jobs, let queued and running ones finish
//   (then await_termination() waits for them)
// - shutdown_now(): stop accepting jobs and abort everything, queued or
//   running. A running job stops at its next .await.
// =============================================================================

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};
use tokio::task::JoinSet;
use tracing::debug;

#[derive(Debug)]
struct PoolState {
    accepting: bool,
    tasks: JoinSet<()>,
}

#[derive(Debug)]
pub struct WorkerPool {
    name: &'static str,
    permits: Arc<Semaphore>,
    state: Mutex<PoolState>,
    /// Wakes await_termination() when shutdown_now() runs during the wait
    aborted: Notify,
}

impl WorkerPool {
    pub fn new(name: &'static str, workers: usize) -> Self {
        Self {
            name,
            permits: Arc::new(Semaphore::new(workers)),
            state: Mutex::new(PoolState {
                accepting: true,
                tasks: JoinSet::new(),
            }),
            aborted: Notify::new(),
        }
    }

    // Queues a job
    //
    // Returns false if the pool has been shut down; the job is dropped.
    // Must be called from inside the tokio runtime.
    pub fn submit<F>(&self, job: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.state.lock();
        if !state.accepting {
            return false;
        }

        // Reap finished tasks so the set doesn't grow for the whole crawl
        while state.tasks.try_join_next().is_some() {}

        let permits = Arc::clone(&self.permits);
        state.tasks.spawn(async move {
            // A closed semaphore means shutdown_now() ran while we were queued
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            job.await;
        });
        true
    }

    pub fn shutdown(&self) {
        self.state.lock().accepting = false;
    }

    pub fn shutdown_now(&self) {
        let mut state = self.state.lock();
        state.accepting = false;
        self.permits.close();
        debug!(pool = self.name, tasks = state.tasks.len(), "aborting pool");
        state.tasks.abort_all();
        self.aborted.notify_waiters();
    }

    // Waits until every job submitted so far has finished or been aborted
    pub async fn await_termination(&self) {
        let mut tasks = std::mem::take(&mut self.state.lock().tasks);

        let aborted = self.aborted.notified();
        tokio::pin!(aborted);
        aborted.as_mut().enable();
        let mut aborting = self.permits.is_closed();
        if aborting {
            tasks.abort_all();
        }

        loop {
            tokio::select! {
                next = tasks.join_next() => {
                    if next.is_none() {
                        break;
                    }
                }
                _ = &mut aborted, if !aborting => {
                    aborting = true;
                    tasks.abort_all();
                }
            }
        }
        debug!(pool = self.name, "pool terminated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_runs_all_jobs() {
        let pool = WorkerPool::new("test", 3);
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let done = Arc::clone(&done);
            assert!(pool.submit(async move {
                done.fetch_add(1, Ordering::SeqCst);
            }));
        }
        pool.shutdown();
        pool.await_termination().await;

        assert_eq!(done.load(Ordering::SeqCst), 20);
        assert!(!pool.submit(async {}));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let pool = WorkerPool::new("test", 2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            pool.submit(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            });
        }
        pool.shutdown();
        pool.await_termination().await;

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_shutdown_now_drops_queued_jobs() {
        let pool = WorkerPool::new("test", 1);
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let done = Arc::clone(&done);
            pool.submit(async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                done.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.shutdown_now();
        pool.await_termination().await;

        assert_eq!(done.load(Ordering::SeqCst), 0);
        assert!(!pool.submit(async {}));
    }

    #[tokio::test]
    async fn test_shutdown_now_while_awaiting_termination() {
        let pool = Arc::new(WorkerPool::new("test", 2));
        for _ in 0..4 {
            pool.submit(tokio::time::sleep(Duration::from_secs(30)));
        }
        pool.shutdown();

        let waiter = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.await_termination().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        pool.shutdown_now();

        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("await_termination should return after shutdown_now")
            .unwrap();
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Semaphore and not a fixed set of worker threads?
//    - Every job is its own tokio task, but it must hold a permit to run
//    - The semaphore has N permits, so at most N jobs run at once
//    - Jobs waiting for a permit cost almost nothing while they wait
//
// 2. What does JoinSet give us?
//    - It owns every task we spawned
//    - abort_all() cancels them in one call (shutdown_now)
//    - join_next() lets us wait for them one by one (await_termination)
//
// 3. Why std::mem::take in await_termination?
//    - We can't hold a parking_lot lock across an .await
//    - take() moves the JoinSet out and leaves an empty one behind,
//      so the lock is released before we start waiting
//    - The Notify lets shutdown_now() reach the tasks we moved out
// -----------------------------------------------------------------------------
