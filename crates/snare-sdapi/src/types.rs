//! Script Debugger API wire types.
//!
//! Field names are snake_case on the wire (`script_threads`, `line_number`),
//! which is serde's default, so no rename attributes are needed. `call_stack`
//! may be absent on freshly-started threads; it defaults to empty.

use serde::{Deserialize, Serialize};

/// A breakpoint to create (request side).
#[derive(Clone, Debug, Serialize)]
pub struct BreakpointSpec {
    /// 1-based line number in the script.
    pub line_number: u32,
    /// Absolute script path (`/{cartridge}/cartridge/...`).
    pub script_path: String,
}

/// A server-registered breakpoint (response side).
#[derive(Clone, Debug, Deserialize)]
pub struct Breakpoint {
    /// Server-assigned id.
    pub id: u32,
    /// Line the server registered.
    pub line_number: u32,
    /// Script path the server registered.
    pub script_path: String,
}

/// Request body for `POST /breakpoints`.
#[derive(Debug, Serialize)]
pub struct BreakpointsRequest {
    /// All candidate breakpoints, created in one batch.
    pub breakpoints: Vec<BreakpointSpec>,
}

/// Response body for `POST /breakpoints`.
#[derive(Debug, Deserialize)]
pub struct BreakpointsResponse {
    /// Breakpoints the server actually created.
    #[serde(default)]
    pub breakpoints: Vec<Breakpoint>,
}

/// Execution status of a script thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    /// Executing normally.
    Running,
    /// Suspended at a breakpoint, awaiting remote commands.
    Halted,
    /// Any status this client does not model.
    #[serde(other)]
    Other,
}

/// Source location of a call-stack frame.
#[derive(Clone, Debug, Deserialize)]
pub struct FrameLocation {
    /// Enclosing function name.
    #[serde(default)]
    pub function_name: String,
    /// 1-based line number.
    #[serde(default)]
    pub line_number: u32,
    /// Absolute script path.
    #[serde(default)]
    pub script_path: String,
}

/// One call-stack frame. Index 0 is the innermost frame.
#[derive(Clone, Debug, Deserialize)]
pub struct StackFrame {
    /// Frame index (0 = innermost).
    pub index: u32,
    /// Source location.
    pub location: FrameLocation,
}

/// A server-side script execution context.
#[derive(Clone, Debug, Deserialize)]
pub struct ScriptThread {
    /// Thread id, used in per-thread endpoints.
    pub id: u64,
    /// Current execution status.
    pub status: ThreadStatus,
    /// Call stack; absent until the thread has halted.
    #[serde(default)]
    pub call_stack: Vec<StackFrame>,
}

impl ScriptThread {
    /// Whether the thread is suspended at a breakpoint.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.status == ThreadStatus::Halted
    }
}

/// Response body for `GET /threads`.
#[derive(Debug, Deserialize)]
pub struct ThreadsResponse {
    /// All live script threads.
    #[serde(default)]
    pub script_threads: Vec<ScriptThread>,
}

/// Response body for the eval endpoint.
#[derive(Debug, Deserialize)]
pub struct EvalResponse {
    /// Echo of the evaluated expression.
    #[serde(default)]
    pub expression: Option<String>,
    /// Textual result; absent when the expression produced none.
    #[serde(default)]
    pub result: Option<String>,
}

/// Structured fault carried in non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct Fault {
    /// Fault type name (e.g., `DebuggerAlreadyEnabledException`).
    #[serde(rename = "type", default)]
    pub fault_type: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Envelope wrapping a [`Fault`].
#[derive(Debug, Deserialize)]
pub struct FaultEnvelope {
    /// The fault body.
    pub fault: Fault,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threads_response_parses_halted_thread() {
        let json = r#"{
            "script_threads": [{
                "id": 3,
                "status": "halted",
                "call_stack": [{
                    "index": 0,
                    "location": {
                        "function_name": "show()",
                        "line_number": 12,
                        "script_path": "/app_storefront_base/cartridge/controllers/Home.js"
                    }
                }]
            }]
        }"#;
        let parsed: ThreadsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.script_threads.len(), 1);
        let thread = &parsed.script_threads[0];
        assert!(thread.is_halted());
        assert_eq!(thread.call_stack[0].index, 0);
        assert_eq!(thread.call_stack[0].location.line_number, 12);
    }

    #[test]
    fn thread_without_call_stack_parses() {
        let json = r#"{"script_threads": [{"id": 1, "status": "running"}]}"#;
        let parsed: ThreadsResponse = serde_json::from_str(json).unwrap();
        assert!(!parsed.script_threads[0].is_halted());
        assert!(parsed.script_threads[0].call_stack.is_empty());
    }

    #[test]
    fn unknown_thread_status_maps_to_other() {
        let json = r#"{"script_threads": [{"id": 1, "status": "suspended"}]}"#;
        let parsed: ThreadsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.script_threads[0].status, ThreadStatus::Other);
    }

    #[test]
    fn empty_threads_response_parses() {
        let parsed: ThreadsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.script_threads.is_empty());
    }

    #[test]
    fn eval_response_result_optional() {
        let parsed: EvalResponse = serde_json::from_str(r#"{"expression": "1+1"}"#).unwrap();
        assert!(parsed.result.is_none());
        let parsed: EvalResponse =
            serde_json::from_str(r#"{"expression": "1+1", "result": "2"}"#).unwrap();
        assert_eq!(parsed.result.as_deref(), Some("2"));
    }

    #[test]
    fn fault_envelope_parses() {
        let json = r#"{"fault": {"type": "DebuggerAlreadyEnabledException", "message": "Debugger is already enabled."}}"#;
        let parsed: FaultEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.fault.fault_type, "DebuggerAlreadyEnabledException");
        assert!(parsed.fault.message.contains("already enabled"));
    }

    #[test]
    fn breakpoints_request_serializes_batch() {
        let req = BreakpointsRequest {
            breakpoints: vec![
                BreakpointSpec {
                    line_number: 1,
                    script_path: "/c/cartridge/controllers/Home.js".into(),
                },
                BreakpointSpec {
                    line_number: 2,
                    script_path: "/c/cartridge/controllers/Home.js".into(),
                },
            ],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["breakpoints"].as_array().unwrap().len(), 2);
        assert_eq!(json["breakpoints"][0]["line_number"], 1);
    }
}
