//! # snare-sdapi
//!
//! Script Debugger API client — the protocol boundary between snare and the
//! remote script engine.
//!
//! Covers the full control surface on a fixed base path per host
//! (`/s/-/dw/debugger/v2_0`): session create/delete, batch breakpoint
//! install, breakpoint clear-all, thread listing, watchdog reset,
//! resume/stop, and frame evaluation. Orchestration policy (what to do with
//! a fault, when to retry, how long to poll) lives in `snare-runtime`; this
//! crate only speaks the wire.

#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod types;

pub use client::DebuggerClient;
pub use error::SdapiError;
pub use types::{
    Breakpoint, BreakpointSpec, EvalResponse, Fault, FaultEnvelope, FrameLocation, ScriptThread,
    StackFrame, ThreadStatus, ThreadsResponse,
};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
