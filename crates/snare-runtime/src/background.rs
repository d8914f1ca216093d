//! Background trigger task tracker.
//!
//! Storefront trigger requests are fire-and-forget by design: the request is
//! expected to hang at a breakpoint while the evaluation proceeds, so the
//! evaluator never awaits it inline. The tracker keeps handles so shutdown
//! can wait for stragglers instead of leaking connections.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinSet;
use tracing::warn;

/// Tracks in-flight trigger tasks for draining at shutdown.
///
/// Registration is synchronous: once [`spawn`](Self::spawn) returns, the
/// task is visible to [`drain_all`](Self::drain_all). The mutex is a plain
/// blocking one, held only for the registration or batch-swap instant and
/// never across an await.
pub struct BackgroundTracker {
    /// Tracked tasks.
    tasks: Arc<Mutex<JoinSet<()>>>,
    /// Approximate count of pending tasks (atomic for lock-free reads).
    pending: Arc<AtomicUsize>,
}

impl BackgroundTracker {
    /// Create a new empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(Mutex::new(JoinSet::new())),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn lock_tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawn a future as a tracked background task.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn<F>(&self, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let pending = Arc::clone(&self.pending);
        let _ = pending.fetch_add(1, Ordering::Relaxed);

        let _ = self.lock_tasks().spawn(async move {
            future.await;
            let _ = pending.fetch_sub(1, Ordering::Relaxed);
        });
    }

    /// Wait for all tracked tasks to complete, including ones spawned while
    /// the drain is in progress.
    ///
    /// Panics in individual tasks are logged and swallowed.
    pub async fn drain_all(&self) {
        loop {
            // Swap the set out so nothing is held across the awaits below.
            let mut batch = {
                let mut guard = self.lock_tasks();
                if guard.is_empty() {
                    break;
                }
                std::mem::take(&mut *guard)
            };
            while let Some(result) = batch.join_next().await {
                if let Err(e) = result {
                    warn!(error = %e, "background trigger task panicked");
                }
            }
        }
    }

    /// Wait for all tracked tasks, bounded by `timeout`.
    ///
    /// Returns `true` if every task completed in time. A hung trigger
    /// connection is the normal reason this returns `false`; when the
    /// timeout fires, the batch being awaited is dropped, which aborts its
    /// remaining tasks and closes their connections.
    pub async fn drain_with_timeout(&self, timeout: std::time::Duration) -> bool {
        tokio::time::timeout(timeout, self.drain_all())
            .await
            .is_ok()
    }

    /// Approximate number of pending tasks.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }
}

impl Default for BackgroundTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BackgroundTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundTracker")
            .field("pending_count", &self.pending_count())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
