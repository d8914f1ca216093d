//! Script Debugger API error types.

use thiserror::Error;

/// Errors from debugger-control calls.
#[derive(Debug, Error)]
pub enum SdapiError {
    /// Network-level failure (connect, DNS, body read).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape.
    #[error("protocol JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structured fault reported by the control API, surfaced verbatim.
    #[error("remote fault {fault_type}: {message}")]
    Fault {
        /// HTTP status the fault arrived with.
        status: u16,
        /// The server's fault `type` field.
        fault_type: String,
        /// The server's fault `message` field.
        message: String,
    },

    /// Non-success status with no parseable fault body.
    #[error("unexpected HTTP {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Raw response body (may be empty).
        body: String,
    },

    /// A per-call budget lapsed before the server answered.
    #[error("timed out after {timeout_ms}ms: {context}")]
    Timeout {
        /// How long we waited.
        timeout_ms: u64,
        /// Which call was in flight.
        context: String,
    },
}

impl SdapiError {
    /// The structured fault `type`, when the server supplied one.
    #[must_use]
    pub fn fault_type(&self) -> Option<&str> {
        match self {
            Self::Fault { fault_type, .. } => Some(fault_type),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_display_carries_type_and_message() {
        let err = SdapiError::Fault {
            status: 400,
            fault_type: "DebuggerAlreadyEnabledException".into(),
            message: "Debugger is already enabled.".into(),
        };
        assert_eq!(
            err.to_string(),
            "remote fault DebuggerAlreadyEnabledException: Debugger is already enabled."
        );
        assert_eq!(err.fault_type(), Some("DebuggerAlreadyEnabledException"));
    }

    #[test]
    fn unexpected_status_display() {
        let err = SdapiError::UnexpectedStatus {
            status: 502,
            body: "Bad Gateway".into(),
        };
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn timeout_display() {
        let err = SdapiError::Timeout {
            timeout_ms: 10_000,
            context: "GET /threads".into(),
        };
        assert!(err.to_string().contains("10000ms"));
        assert!(err.to_string().contains("GET /threads"));
    }

    #[test]
    fn non_fault_has_no_fault_type() {
        let err = SdapiError::Timeout {
            timeout_ms: 1,
            context: "x".into(),
        };
        assert!(err.fault_type().is_none());
    }
}
