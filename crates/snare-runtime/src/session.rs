//! Debug session lifecycle.
//!
//! The server allows one debug client per `x-dw-client-id`, so session state
//! is a plain bool owned by the single evaluation worker. Contention on
//! enable (a stale session from a crashed run, or another tool holding the
//! slot) is resolved by deleting the existing client and retrying once.

use tracing::{debug, info, warn};

use snare_core::guidance::is_contention;
use snare_sdapi::DebuggerClient;

use crate::errors::EvalError;

/// Tracks whether the exclusive debug session is currently enabled.
#[derive(Debug, Default)]
pub struct SessionManager {
    enabled: bool,
}

impl SessionManager {
    /// A manager with no session enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the session is currently enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable the debug session if it is not already.
    ///
    /// Returns `true` when an existing session had to be taken over, so the
    /// caller can surface a warning to the user whose session was evicted.
    ///
    /// # Errors
    ///
    /// [`EvalError::Takeover`] when contention persists through the
    /// delete-and-retry, or the takeover delete itself fails;
    /// [`EvalError::Sdapi`] for any other enable failure.
    pub async fn ensure_enabled(&mut self, client: &DebuggerClient) -> Result<bool, EvalError> {
        if self.enabled {
            return Ok(false);
        }

        match client.create_client().await {
            Ok(()) => {
                debug!("debug session enabled");
                self.enabled = true;
                Ok(false)
            }
            Err(error) if is_contention(error.fault_type(), &error.to_string()) => {
                info!(%error, "debug session held elsewhere, taking over");
                client.delete_client().await.map_err(EvalError::Takeover)?;
                client.create_client().await.map_err(EvalError::Takeover)?;
                self.enabled = true;
                Ok(true)
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Disable the debug session.
    ///
    /// The local flag drops first so a failed delete never wedges the
    /// manager into believing a dead session is live; delete failures are
    /// logged and swallowed.
    pub async fn disable(&mut self, client: &DebuggerClient) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        if let Err(error) = client.delete_client().await {
            warn!(%error, "debug session delete failed");
        } else {
            debug!("debug session disabled");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
