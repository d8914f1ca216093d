//! Halt polling.
//!
//! After the trigger fires, the script thread list is polled until a halted
//! thread shows up or the overall budget runs out. Individual list failures
//! are transient by nature while the server is busy executing, so they are
//! logged and the loop keeps going.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use snare_sdapi::{DebuggerClient, ScriptThread};

use crate::errors::EvalError;

/// Poll [`DebuggerClient::list_threads`] until a halted thread appears.
///
/// Each list call gets the smaller of `per_call` and the remaining overall
/// budget. The halted thread's server-side timeout is reset before it is
/// returned so the session does not tear it down mid-evaluation; a failed
/// reset is logged and the thread is still returned.
///
/// # Errors
///
/// [`EvalError::HaltTimeout`] once `overall` elapses with no halted thread.
pub async fn wait_for_halted(
    client: &DebuggerClient,
    overall: Duration,
    per_call: Duration,
    interval: Duration,
) -> Result<ScriptThread, EvalError> {
    let deadline = Instant::now() + overall;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(EvalError::HaltTimeout {
                timeout_ms: overall.as_millis() as u64,
            });
        }

        match client.list_threads(per_call.min(remaining)).await {
            Ok(threads) => {
                if let Some(thread) = threads.into_iter().find(ScriptThread::is_halted) {
                    debug!(thread_id = thread.id, "thread halted");
                    if let Err(error) = client.reset_thread_timeout().await {
                        warn!(thread_id = thread.id, %error, "thread timeout reset failed");
                    }
                    return Ok(thread);
                }
            }
            Err(error) => debug!(%error, "thread list failed, retrying"),
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(EvalError::HaltTimeout {
                timeout_ms: overall.as_millis() as u64,
            });
        }
        tokio::time::sleep(interval.min(remaining)).await;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
