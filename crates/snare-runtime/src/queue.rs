//! Single-worker evaluation queue.
//!
//! The remote debugger holds one breakpoint set and one halted thread per
//! session, so evaluations must never interleave. The queue owns a single
//! worker task fed by an unbounded channel: submissions from any number of
//! callers are serialized into strict FIFO order, and the worker notifies
//! the runner when the queue goes idle so it can release the session.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, warn};

use crate::types::{EvaluationRequest, EvaluationResult};

/// One unit of work for the worker task.
enum Job {
    /// Run an evaluation and send its result back.
    Evaluate {
        request: EvaluationRequest,
        reply: oneshot::Sender<EvaluationResult>,
    },
    /// Stop the worker after the jobs already queued ahead of this one.
    Shutdown { done: oneshot::Sender<()> },
}

/// What the worker drives for each job.
#[async_trait]
pub trait EvaluationRunner: Send + 'static {
    /// Run one evaluation to completion.
    async fn run(&mut self, request: EvaluationRequest) -> EvaluationResult;

    /// Called when the queue has fully drained, before the last result is
    /// delivered. Session release lives here so back-to-back submissions
    /// reuse one session.
    async fn on_idle(&mut self);

    /// Called once when the queue shuts down.
    async fn on_shutdown(&mut self);
}

/// FIFO queue with exactly one worker.
pub struct EvaluationQueue {
    tx: mpsc::UnboundedSender<Job>,
    queued: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    worker: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl EvaluationQueue {
    /// Start the worker task around `runner`.
    #[must_use]
    pub fn new<R: EvaluationRunner>(mut runner: R) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let queued = Arc::new(AtomicUsize::new(0));
        let active = Arc::new(AtomicUsize::new(0));

        let worker_queued = Arc::clone(&queued);
        let worker_active = Arc::clone(&active);
        let worker = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    Job::Evaluate { request, reply } => {
                        let _ = worker_queued.fetch_sub(1, Ordering::SeqCst);
                        let _ = worker_active.fetch_add(1, Ordering::SeqCst);
                        let result = runner.run(request).await;
                        let _ = worker_active.fetch_sub(1, Ordering::SeqCst);

                        // Idle work happens before the reply so the caller
                        // observes a fully settled session.
                        if worker_queued.load(Ordering::SeqCst) == 0 {
                            runner.on_idle().await;
                        }
                        if reply.send(result).is_err() {
                            debug!("evaluation caller went away before the result");
                        }
                    }
                    Job::Shutdown { done } => {
                        runner.on_shutdown().await;
                        let _ = done.send(());
                        break;
                    }
                }
            }
        });

        Self {
            tx,
            queued,
            active,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Submit a request and wait for its result.
    ///
    /// Requests are served strictly in submission order. After shutdown,
    /// submissions come back as rejected results rather than errors.
    pub async fn submit(&self, request: EvaluationRequest) -> EvaluationResult {
        let (reply_tx, reply_rx) = oneshot::channel();
        let _ = self.queued.fetch_add(1, Ordering::SeqCst);
        if self
            .tx
            .send(Job::Evaluate {
                request,
                reply: reply_tx,
            })
            .is_err()
        {
            let _ = self.queued.fetch_sub(1, Ordering::SeqCst);
            return EvaluationResult::rejected("evaluator is shut down");
        }
        match reply_rx.await {
            Ok(result) => result,
            Err(_) => EvaluationResult::rejected("evaluation worker stopped unexpectedly"),
        }
    }

    /// Jobs waiting plus the one currently running.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.queued.load(Ordering::SeqCst) + self.active.load(Ordering::SeqCst)
    }

    /// Stop the worker after draining everything already queued.
    pub async fn shutdown(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Job::Shutdown { done: done_tx }).is_err() {
            return;
        }
        if done_rx.await.is_err() {
            warn!("evaluation worker exited without acknowledging shutdown");
        }
        if let Some(handle) = self.worker.lock().await.take() {
            if let Err(error) = handle.await {
                warn!(%error, "evaluation worker join failed");
            }
        }
    }
}

impl std::fmt::Debug for EvaluationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationQueue")
            .field("depth", &self.depth())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
