//! # snare-runtime
//!
//! Evaluation engine for remote storefront script expressions.
//!
//! An evaluation installs a strategic breakpoint set in a storefront
//! controller, fires a cheap storefront request to drive execution into it,
//! waits for the script thread to halt, evaluates the expression in the
//! halted frame, and cleans up. [`ScriptEvaluator`] serializes concurrent
//! submissions through a single worker since the remote debugger holds one
//! session and one breakpoint set at a time.

#![deny(unsafe_code)]

mod background;
mod cartridge;
mod config;
mod errors;
mod evaluator;
mod poller;
mod queue;
mod session;
mod trigger;
mod types;

pub use background::BackgroundTracker;
pub use cartridge::{resolve_target, BreakpointTarget, CartridgeProbe, WebDavProbe};
pub use config::EvaluatorConfig;
pub use errors::EvalError;
pub use evaluator::ScriptEvaluator;
pub use poller::wait_for_halted;
pub use queue::{EvaluationQueue, EvaluationRunner};
pub use session::SessionManager;
pub use trigger::{normalize_locale, normalize_site_id, ExecutionTrigger, TriggerOutcome};
pub use types::{EvaluationOptions, EvaluationRequest, EvaluationResult};
