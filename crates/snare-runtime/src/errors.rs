//! Runtime error taxonomy.
//!
//! Everything here is caught at the orchestration boundary and converted
//! into a failure [`EvaluationResult`](crate::types::EvaluationResult) —
//! the public evaluate operation never raises past itself. The Display
//! strings are user-facing and feed the guidance classifier, so the
//! cartridge and halt-timeout messages carry their fixed phrases.

use thiserror::Error;

use snare_sdapi::SdapiError;

/// Errors that can end an evaluation.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Settings or credentials are unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Neither storefront framework variant exists on the code version and
    /// no explicit script path was given.
    #[error("No compatible storefront cartridge found on code version '{code_version}'")]
    NoCartridge {
        /// The code version the probe was keyed by.
        code_version: String,
    },

    /// The server registered none of the candidate breakpoints.
    #[error("server created zero breakpoints for {script_path}")]
    BreakpointInstall {
        /// The script path the batch targeted.
        script_path: String,
    },

    /// The overall deadline lapsed with no halted thread observed. A
    /// distinct, non-exceptional outcome — the remote simply never stopped.
    #[error("Timeout waiting for a halted thread after {timeout_ms}ms")]
    HaltTimeout {
        /// The overall budget that lapsed.
        timeout_ms: u64,
    },

    /// Session contention takeover failed; the delete-then-recreate retry
    /// itself errored. Contention that recovers is never surfaced.
    #[error("debug session takeover failed: {0}")]
    Takeover(#[source] SdapiError),

    /// Any other protocol or transport failure.
    #[error(transparent)]
    Sdapi(#[from] SdapiError),
}

impl EvalError {
    /// The structured fault `type`, when the underlying failure carried one.
    #[must_use]
    pub fn fault_type(&self) -> Option<&str> {
        match self {
            Self::Takeover(source) | Self::Sdapi(source) => source.fault_type(),
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
    fn no_cartridge_message_has_fixed_phrase() {
        let err = EvalError::NoCartridge {
            code_version: "version1".into(),
        };
        assert!(err.to_string().contains("No compatible storefront cartridge"));
        assert!(err.to_string().contains("version1"));
    }

    #[test]
    fn halt_timeout_message_has_fixed_phrase() {
        let err = EvalError::HaltTimeout { timeout_ms: 30_000 };
        assert!(err.to_string().contains("Timeout waiting"));
        assert!(err.to_string().contains("30000ms"));
    }

    #[test]
    fn sdapi_fault_is_transparent() {
        let err = EvalError::Sdapi(SdapiError::Fault {
            status: 403,
            fault_type: "AuthorizationException".into(),
            message: "forbidden".into(),
        });
        assert_eq!(err.to_string(), "remote fault AuthorizationException: forbidden");
        assert_eq!(err.fault_type(), Some("AuthorizationException"));
    }

    #[test]
    fn takeover_wraps_source() {
        let err = EvalError::Takeover(SdapiError::UnexpectedStatus {
            status: 500,
            body: "boom".into(),
        });
        assert!(err.to_string().contains("takeover failed"));
        assert!(err.fault_type().is_none());
    }

    #[test]
    fn configuration_message_passthrough() {
        let err = EvalError::Configuration("sandbox hostname is not set".into());
        assert!(err.to_string().contains("hostname"));
    }
}
