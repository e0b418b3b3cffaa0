// crates/chooser-portal-broker/src/workers.rs
// ============================================================================
// Module: Chooser Portal Response Workers
// Description: Bounded blocking-pool execution for the translation stage.
// Purpose: Keep answer arrival non-blocking while bounding registration work.
// Dependencies: tokio, tracing
// ============================================================================

//! ## Overview
//! [`ResponseWorkers`] runs translation jobs on the runtime's blocking pool,
//! at most `max_workers` at a time. Submission never blocks: it spawns a
//! lightweight task that waits for a permit. [`ActivityTracker`] counts every
//! outstanding pipeline task so callers can wait for the mediator to go idle.
//! Invariants:
//! - No more than `max_workers` jobs run concurrently.
//! - Every submitted job is counted until it finishes or is dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::sync::Semaphore;

// ============================================================================
// SECTION: Activity Tracking
// ============================================================================

/// Counter of outstanding pipeline tasks.
#[derive(Debug, Clone, Default)]
pub struct ActivityTracker {
    /// Shared counter state.
    inner: Arc<ActivityState>,
}

/// Shared state behind [`ActivityTracker`].
#[derive(Debug, Default)]
struct ActivityState {
    /// Number of outstanding tasks.
    active: AtomicUsize,
    /// Signalled when `active` drops to zero.
    idle: Notify,
}

impl ActivityTracker {
    /// Creates an idle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one task until the returned guard drops.
    #[must_use]
    pub fn enter(&self) -> ActivityGuard {
        self.inner.active.fetch_add(1, Ordering::AcqRel);
        ActivityGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Returns the number of outstanding tasks.
    #[must_use]
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Resolves once no task is outstanding.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.active() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Guard keeping one task counted.
#[derive(Debug)]
pub struct ActivityGuard {
    /// Shared counter state.
    inner: Arc<ActivityState>,
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        if self.inner.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

// ============================================================================
// SECTION: Response Workers
// ============================================================================

/// Bounded pool for blocking translation jobs.
#[derive(Debug, Clone)]
pub struct ResponseWorkers {
    /// Runtime used to spawn jobs.
    runtime: Handle,
    /// Permits bounding concurrent jobs.
    permits: Arc<Semaphore>,
    /// Outstanding task counter.
    activity: ActivityTracker,
}

impl ResponseWorkers {
    /// Creates a pool running at most `max_workers` jobs at once.
    #[must_use]
    pub fn new(runtime: Handle, max_workers: usize, activity: ActivityTracker) -> Self {
        Self {
            runtime,
            permits: Arc::new(Semaphore::new(max_workers.max(1))),
            activity,
        }
    }

    /// Queues `job` without blocking the caller.
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let guard = self.activity.enter();
        let permits = Arc::clone(&self.permits);
        let runtime = self.runtime.clone();
        self.runtime.spawn(async move {
            let _guard = guard;
            let Ok(_permit) = permits.acquire_owned().await else {
                tracing::warn!("response worker pool closed, dropping job");
                return;
            };
            if let Err(err) = runtime.spawn_blocking(job).await {
                tracing::error!("response worker failed: {err}");
            }
        });
    }

    /// Returns the number of permits currently free.
    #[must_use]
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
