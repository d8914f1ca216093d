//! Evaluation orchestration.
//!
//! [`EvaluationFlow`] drives one evaluation end to end: resolve a breakpoint
//! target, enable the debug session, install the strategic breakpoint set,
//! fire the storefront trigger in the background, poll for a halted thread,
//! evaluate the expression in frame 0, then clean up. [`ScriptEvaluator`] is
//! the public facade that serializes flows through the queue.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use snare_sdapi::DebuggerClient;

use crate::background::BackgroundTracker;
use crate::cartridge::{resolve_target, CartridgeProbe, WebDavProbe};
use crate::config::EvaluatorConfig;
use crate::errors::EvalError;
use crate::poller::wait_for_halted;
use crate::queue::{EvaluationQueue, EvaluationRunner};
use crate::session::SessionManager;
use crate::trigger::{ExecutionTrigger, TriggerOutcome};
use crate::types::{EvaluationRequest, EvaluationResult};

/// Value reported when the server returns a breakpoint hit with no result,
/// which is what evaluating a statement without a value looks like.
const UNDEFINED_RESULT: &str = "undefined";

/// Budget for draining hung trigger connections at shutdown.
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(3);

/// Runs evaluations one at a time against a single debug session.
pub struct EvaluationFlow {
    client: Arc<DebuggerClient>,
    probe: Arc<dyn CartridgeProbe>,
    trigger: Arc<ExecutionTrigger>,
    tracker: Arc<BackgroundTracker>,
    session: SessionManager,
    config: EvaluatorConfig,
}

impl EvaluationFlow {
    fn new(
        config: EvaluatorConfig,
        probe: Arc<dyn CartridgeProbe>,
        tracker: Arc<BackgroundTracker>,
    ) -> Self {
        let client = Arc::new(DebuggerClient::new(
            config.debugger_base_url.clone(),
            config.debugger_auth.clone(),
            config.client_id.clone(),
            config.call_timeout,
        ));
        let trigger = Arc::new(ExecutionTrigger::new(
            reqwest::Client::new(),
            config.storefront_base_url.clone(),
            config.storefront_auth.clone(),
            config.trigger_timeout,
            config.default_locale.clone(),
        ));
        Self {
            client,
            probe,
            trigger,
            tracker,
            session: SessionManager::new(),
            config,
        }
    }

    /// Best-effort breakpoint wipe; failures never abort the flow.
    async fn clear_breakpoints(&self) {
        if let Err(error) = self.client.delete_breakpoints().await {
            debug!(%error, "breakpoint clear failed");
        }
    }

    #[instrument(skip_all, fields(request_id = %request.id))]
    async fn run_inner(
        &mut self,
        request: &EvaluationRequest,
        warnings: &mut Vec<String>,
        halted: &mut Option<u64>,
    ) -> Result<String, EvalError> {
        let target = resolve_target(
            &request.options,
            self.probe.as_ref(),
            self.config.scan_lines,
            &self.config.code_version,
        )
        .await?;
        debug!(kind = target.variant_name(), script_path = %target.script_path(), "breakpoint target resolved");

        if self.session.ensure_enabled(&self.client).await? {
            warnings.push("Debug session was taken over from another client".to_string());
        }

        // Leftovers from an earlier run would halt execution at the wrong
        // line, so wipe before installing.
        self.clear_breakpoints().await;

        let created = self.client.create_breakpoints(target.breakpoint_specs()).await?;
        if created.is_empty() {
            return Err(EvalError::BreakpointInstall {
                script_path: target.script_path(),
            });
        }
        debug!(created = created.len(), "breakpoints installed");

        let site_id = request
            .options
            .site_id
            .clone()
            .unwrap_or_else(|| self.config.site_id.clone());
        let locale = request.options.locale.clone();
        let trigger = Arc::clone(&self.trigger);
        self.tracker.spawn(async move {
            match trigger.fire(&site_id, locale.as_deref()).await {
                TriggerOutcome::PresumedHalted => debug!("trigger request held at a breakpoint"),
                TriggerOutcome::Completed(status) => {
                    debug!(status, "trigger completed without halting");
                }
                TriggerOutcome::Failed(reason) => warn!(%reason, "storefront trigger failed"),
            }
        });

        let overall = request
            .options
            .timeout_ms
            .map_or(self.config.default_eval_timeout, Duration::from_millis);
        let thread = wait_for_halted(
            &self.client,
            overall,
            self.config.call_timeout,
            self.config.poll_interval,
        )
        .await?;
        *halted = Some(thread.id);

        // Frame 0 is the halted controller frame, the only one whose scope
        // is predictable.
        let response = self.client.evaluate(thread.id, 0, &request.script).await?;
        Ok(response.result.unwrap_or_else(|| UNDEFINED_RESULT.to_string()))
    }
}

#[async_trait]
impl EvaluationRunner for EvaluationFlow {
    async fn run(&mut self, request: EvaluationRequest) -> EvaluationResult {
        let started = Instant::now();
        let mut warnings = Vec::new();
        let mut halted: Option<u64> = None;

        let outcome = self.run_inner(&request, &mut warnings, &mut halted).await;

        // Terminal cleanup runs on both paths. The session itself stays
        // enabled here; release is the queue's drain decision.
        self.clear_breakpoints().await;
        if let Some(thread_id) = halted {
            if let Err(error) = self.client.resume_thread(thread_id).await {
                debug!(thread_id, %error, "thread resume failed");
            }
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(result) => {
                info!(request_id = %request.id, elapsed_ms, "evaluation succeeded");
                EvaluationResult::success(result, elapsed_ms, warnings)
            }
            Err(error) => {
                warn!(request_id = %request.id, elapsed_ms, %error, "evaluation failed");
                EvaluationResult::failure(&error, elapsed_ms, warnings)
            }
        }
    }

    async fn on_idle(&mut self) {
        self.session.disable(&self.client).await;
    }

    async fn on_shutdown(&mut self) {
        self.clear_breakpoints().await;
        self.session.disable(&self.client).await;
    }
}

/// Public entry point: submit expressions, get results, shut down cleanly.
pub struct ScriptEvaluator {
    queue: EvaluationQueue,
    tracker: Arc<BackgroundTracker>,
}

impl ScriptEvaluator {
    /// Build an evaluator whose cartridge probe checks the sandbox's WebDAV
    /// tree.
    #[must_use]
    pub fn new(config: EvaluatorConfig) -> Self {
        let probe = Arc::new(WebDavProbe::new(
            reqwest::Client::new(),
            config.webdav_base_url.clone(),
            config.debugger_auth.clone(),
            config.code_version.clone(),
        ));
        Self::with_probe(config, probe)
    }

    /// Build an evaluator with an explicit probe.
    #[must_use]
    pub fn with_probe(config: EvaluatorConfig, probe: Arc<dyn CartridgeProbe>) -> Self {
        let tracker = Arc::new(BackgroundTracker::new());
        let flow = EvaluationFlow::new(config, probe, Arc::clone(&tracker));
        Self {
            queue: EvaluationQueue::new(flow),
            tracker,
        }
    }

    /// Evaluate one request. Concurrent callers are served in submission
    /// order, one at a time.
    pub async fn evaluate(&self, request: EvaluationRequest) -> EvaluationResult {
        self.queue.submit(request).await
    }

    /// Number of trigger requests still in flight.
    #[must_use]
    pub fn pending_triggers(&self) -> usize {
        self.tracker.pending_count()
    }

    /// Drain the queue, release the session, and wait briefly for hung
    /// trigger connections.
    pub async fn shutdown(&self) {
        self.queue.shutdown().await;
        if !self.tracker.drain_with_timeout(SHUTDOWN_DRAIN_TIMEOUT).await {
            debug!("trigger connections still open at shutdown");
        }
    }
}

impl std::fmt::Debug for ScriptEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptEvaluator")
            .field("queue", &self.queue)
            .field("pending_triggers", &self.pending_triggers())
            .finish()
    }
}
