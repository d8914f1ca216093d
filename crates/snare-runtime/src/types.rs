//! Evaluation request and result types.

use serde::Serialize;
use uuid::Uuid;

use snare_core::guidance::guidance_hints;

use crate::errors::EvalError;

/// Per-request options. All fields are optional; unset fields fall back to
/// configuration.
#[derive(Clone, Debug, Default)]
pub struct EvaluationOptions {
    /// Overall halt-poll budget in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Site id for the execution trigger (bare or `Sites-{id}-Site` form).
    pub site_id: Option<String>,
    /// Locale segment for the trigger retry URL.
    pub locale: Option<String>,
    /// Explicit breakpoint script path, bypassing cartridge auto-detection.
    pub script_path: Option<String>,
    /// Explicit breakpoint line; only meaningful with `script_path`.
    pub line: Option<u32>,
}

/// One request to evaluate a script expression. Ephemeral — created per
/// call, discarded after the result is produced.
#[derive(Clone, Debug)]
pub struct EvaluationRequest {
    /// Correlation id for logs. Never sent to the remote.
    pub id: Uuid,
    /// The script expression to evaluate.
    pub script: String,
    /// Per-request options.
    pub options: EvaluationOptions,
}

impl EvaluationRequest {
    /// Create a request with default options.
    #[must_use]
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            script: script.into(),
            options: EvaluationOptions::default(),
        }
    }

    /// Attach options.
    #[must_use]
    pub fn with_options(mut self, options: EvaluationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Terminal outcome of one evaluation. Never retried automatically.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    /// Whether the expression was evaluated.
    pub success: bool,
    /// Textual result (present on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Error message (present on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock time from admission into the flow to the terminal state.
    pub execution_time_ms: u64,
    /// Non-fatal observations (session takeover, odd trigger outcomes).
    pub warnings: Vec<String>,
    /// Heuristic hints pointing at the likely misconfiguration. Empty on
    /// success.
    pub guidance: Vec<String>,
}

impl EvaluationResult {
    /// Successful evaluation.
    #[must_use]
    pub fn success(result: String, execution_time_ms: u64, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
            execution_time_ms,
            warnings,
            guidance: Vec::new(),
        }
    }

    /// Failed evaluation. Guidance is derived from the error's structured
    /// fault type when present, else from its message.
    #[must_use]
    pub fn failure(error: &EvalError, execution_time_ms: u64, warnings: Vec<String>) -> Self {
        let message = error.to_string();
        let guidance = guidance_hints(error.fault_type(), &message);
        Self {
            success: false,
            result: None,
            error: Some(message),
            execution_time_ms,
            warnings,
            guidance,
        }
    }

    /// A request that never entered the flow (e.g., submitted after
    /// shutdown).
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        let message = message.into();
        let guidance = guidance_hints(None, &message);
        Self {
            success: false,
            result: None,
            error: Some(message),
            execution_time_ms: 0,
            warnings: Vec::new(),
            guidance,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
