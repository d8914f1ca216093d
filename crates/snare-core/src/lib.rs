//! # snare-core
//!
//! Shared foundations for the snare workspace:
//! - [`guidance`]: fault classification and heuristic guidance hints for
//!   failed evaluations
//! - [`logging`]: `tracing` subscriber setup
//!
//! Everything here is protocol-agnostic; the Script Debugger API wire types
//! live in `snare-sdapi` and the orchestration in `snare-runtime`.

#![deny(unsafe_code)]

pub mod guidance;
pub mod logging;

pub use guidance::{FaultCategory, classify, guidance_hints, is_contention};
pub use logging::init_subscriber;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
