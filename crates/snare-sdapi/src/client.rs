//! Script Debugger API client.
//!
//! One client per debug session. Every call carries the Basic auth header
//! plus the fixed `x-dw-client-id` header, and runs under its own bounded
//! timeout. 204 responses are success without body parsing; non-2xx bodies
//! are parsed as `{fault: {type, message}}` when possible.

use std::time::Duration;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::debug;

use crate::error::SdapiError;
use crate::types::{
    Breakpoint, BreakpointSpec, BreakpointsRequest, BreakpointsResponse, EvalResponse, FaultEnvelope,
    ScriptThread, ThreadsResponse,
};

/// Fixed client-identifying header required on every control call.
const CLIENT_ID_HEADER: &str = "x-dw-client-id";

/// Base path of the Script Debugger API, fixed per host.
const DEBUGGER_BASE_PATH: &str = "/s/-/dw/debugger/v2_0";

/// HTTP client for the Script Debugger API.
pub struct DebuggerClient {
    http: reqwest::Client,
    base_url: String,
    auth_header: String,
    client_id: String,
    call_timeout: Duration,
}

impl DebuggerClient {
    /// Create a client against an explicit base URL (used by tests).
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        auth_header: impl Into<String>,
        client_id: impl Into<String>,
        call_timeout: Duration,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            auth_header: auth_header.into(),
            client_id: client_id.into(),
            call_timeout,
        }
    }

    /// Create a client for a sandbox hostname.
    #[must_use]
    pub fn for_host(
        hostname: &str,
        auth_header: impl Into<String>,
        client_id: impl Into<String>,
        call_timeout: Duration,
    ) -> Self {
        Self::new(
            format!("https://{hostname}{DEBUGGER_BASE_PATH}"),
            auth_header,
            client_id,
            call_timeout,
        )
    }

    // ─── Session ─────────────────────────────────────────────────────────

    /// `POST /client` — create the exclusive debug session.
    pub async fn create_client(&self) -> Result<(), SdapiError> {
        let _ = self
            .send(Method::POST, "/client", None, self.call_timeout)
            .await?;
        Ok(())
    }

    /// `DELETE /client` — destroy the debug session.
    pub async fn delete_client(&self) -> Result<(), SdapiError> {
        let _ = self
            .send(Method::DELETE, "/client", None, self.call_timeout)
            .await?;
        Ok(())
    }

    // ─── Breakpoints ─────────────────────────────────────────────────────

    /// `POST /breakpoints` — create all candidate breakpoints in one batch.
    ///
    /// Returns the breakpoints the server actually registered, which may be
    /// fewer than requested (invalid lines are dropped server-side).
    pub async fn create_breakpoints(
        &self,
        specs: Vec<BreakpointSpec>,
    ) -> Result<Vec<Breakpoint>, SdapiError> {
        let body = serde_json::to_value(BreakpointsRequest { breakpoints: specs })?;
        let text = self
            .send(Method::POST, "/breakpoints", Some(body), self.call_timeout)
            .await?;
        let parsed: BreakpointsResponse = serde_json::from_str(&text)?;
        Ok(parsed.breakpoints)
    }

    /// `DELETE /breakpoints` — delete all breakpoints for this session.
    pub async fn delete_breakpoints(&self) -> Result<(), SdapiError> {
        let _ = self
            .send(Method::DELETE, "/breakpoints", None, self.call_timeout)
            .await?;
        Ok(())
    }

    // ─── Threads ─────────────────────────────────────────────────────────

    /// `GET /threads` — list script threads, under an explicit budget.
    ///
    /// The budget is caller-supplied because the halt poller bounds each
    /// iteration by the lesser of the fixed per-call budget and whatever
    /// remains of the overall deadline.
    pub async fn list_threads(&self, budget: Duration) -> Result<Vec<ScriptThread>, SdapiError> {
        let text = self.send(Method::GET, "/threads", None, budget).await?;
        let parsed: ThreadsResponse = serde_json::from_str(&text)?;
        Ok(parsed.script_threads)
    }

    /// `POST /threads/reset` — reset the remote session's inactivity watchdog.
    pub async fn reset_thread_timeout(&self) -> Result<(), SdapiError> {
        let _ = self
            .send(Method::POST, "/threads/reset", None, self.call_timeout)
            .await?;
        Ok(())
    }

    /// `POST /threads/{id}/resume` — resume a halted thread.
    pub async fn resume_thread(&self, thread_id: u64) -> Result<(), SdapiError> {
        let path = format!("/threads/{thread_id}/resume");
        let _ = self
            .send(Method::POST, &path, None, self.call_timeout)
            .await?;
        Ok(())
    }

    /// `POST /threads/{id}/stop` — stop a thread outright.
    pub async fn stop_thread(&self, thread_id: u64) -> Result<(), SdapiError> {
        let path = format!("/threads/{thread_id}/stop");
        let _ = self
            .send(Method::POST, &path, None, self.call_timeout)
            .await?;
        Ok(())
    }

    // ─── Evaluation ──────────────────────────────────────────────────────

    /// `GET /threads/{id}/frames/{frame}/eval?expr=…` — evaluate an
    /// expression in a halted thread's frame.
    pub async fn evaluate(
        &self,
        thread_id: u64,
        frame: u32,
        expr: &str,
    ) -> Result<EvalResponse, SdapiError> {
        let encoded = utf8_percent_encode(expr, NON_ALPHANUMERIC);
        let path = format!("/threads/{thread_id}/frames/{frame}/eval?expr={encoded}");
        let text = self
            .send(Method::GET, &path, None, self.call_timeout)
            .await?;
        let parsed: EvalResponse = serde_json::from_str(&text)?;
        Ok(parsed)
    }

    // ─── Request helper ──────────────────────────────────────────────────

    /// Send one control call under a bounded timeout.
    ///
    /// Success returns the response body text (empty for 204). Non-success
    /// parses a structured fault when possible, else surfaces the raw body.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        budget: Duration,
    ) -> Result<String, SdapiError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%method, %url, "debugger control call");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(AUTHORIZATION, &self.auth_header)
            .header(CLIENT_ID_HEADER, &self.client_id);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::NO_CONTENT {
                return Ok(String::new());
            }

            let text = response.text().await.unwrap_or_default();
            if status.is_success() {
                return Ok(text);
            }

            if let Ok(envelope) = serde_json::from_str::<FaultEnvelope>(&text) {
                return Err(SdapiError::Fault {
                    status: status.as_u16(),
                    fault_type: envelope.fault.fault_type,
                    message: envelope.fault.message,
                });
            }
            Err(SdapiError::UnexpectedStatus {
                status: status.as_u16(),
                body: text,
            })
        };

        tokio::time::timeout(budget, exchange)
            .await
            .map_err(|_| SdapiError::Timeout {
                timeout_ms: u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                context: format!("{method} {path}"),
            })?
    }
}

impl std::fmt::Debug for DebuggerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebuggerClient")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> DebuggerClient {
        DebuggerClient::new(
            server.uri(),
            "Basic dGVzdDp0ZXN0",
            "snare-test",
            Duration::from_secs(2),
        )
    }

    #[tokio::test]
    async fn create_client_sends_auth_and_client_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/client"))
            .and(header(AUTHORIZATION.as_str(), "Basic dGVzdDp0ZXN0"))
            .and(header(CLIENT_ID_HEADER, "snare-test"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server).create_client().await.unwrap();
    }

    #[tokio::test]
    async fn create_client_parses_fault_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/client"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "fault": {
                    "type": "DebuggerAlreadyEnabledException",
                    "message": "Debugger is already enabled."
                }
            })))
            .mount(&server)
            .await;

        let err = test_client(&server).create_client().await.unwrap_err();
        assert_matches!(err, SdapiError::Fault { ref fault_type, .. }
            if fault_type == "DebuggerAlreadyEnabledException");
    }

    #[tokio::test]
    async fn create_client_unparseable_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/client"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = test_client(&server).create_client().await.unwrap_err();
        assert_matches!(err, SdapiError::UnexpectedStatus { status: 502, .. });
    }

    #[tokio::test]
    async fn delete_client_accepts_204() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/client"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server).delete_client().await.unwrap();
    }

    #[tokio::test]
    async fn create_breakpoints_is_one_batch_call() {
        let server = MockServer::start().await;
        let expected_body = serde_json::json!({
            "breakpoints": [
                {"line_number": 1, "script_path": "/c/cartridge/controllers/Home.js"},
                {"line_number": 2, "script_path": "/c/cartridge/controllers/Home.js"},
            ]
        });
        Mock::given(method("POST"))
            .and(path("/breakpoints"))
            .and(body_json(&expected_body))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "breakpoints": [
                    {"id": 10, "line_number": 1, "script_path": "/c/cartridge/controllers/Home.js"},
                    {"id": 11, "line_number": 2, "script_path": "/c/cartridge/controllers/Home.js"},
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let specs = vec![
            BreakpointSpec {
                line_number: 1,
                script_path: "/c/cartridge/controllers/Home.js".into(),
            },
            BreakpointSpec {
                line_number: 2,
                script_path: "/c/cartridge/controllers/Home.js".into(),
            },
        ];
        let created = test_client(&server).create_breakpoints(specs).await.unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].id, 10);
    }

    #[tokio::test]
    async fn create_breakpoints_empty_response_is_ok_here() {
        // Zero created breakpoints is the runtime's error to raise, not the
        // protocol client's.
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/breakpoints"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"breakpoints": []})),
            )
            .mount(&server)
            .await;

        let created = test_client(&server)
            .create_breakpoints(vec![BreakpointSpec {
                line_number: 1,
                script_path: "/x.js".into(),
            }])
            .await
            .unwrap();
        assert!(created.is_empty());
    }

    #[tokio::test]
    async fn list_threads_parses_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "script_threads": [
                    {"id": 1, "status": "running"},
                    {"id": 2, "status": "halted", "call_stack": [
                        {"index": 0, "location": {"function_name": "show()", "line_number": 5, "script_path": "/c/x.js"}}
                    ]},
                ]
            })))
            .mount(&server)
            .await;

        let threads = test_client(&server)
            .list_threads(Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(threads.len(), 2);
        assert!(!threads[0].is_halted());
        assert!(threads[1].is_halted());
    }

    #[tokio::test]
    async fn list_threads_times_out_under_budget() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"script_threads": []}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let err = test_client(&server)
            .list_threads(Duration::from_millis(100))
            .await
            .unwrap_err();
        assert_matches!(err, SdapiError::Timeout { timeout_ms: 100, .. });
    }

    #[tokio::test]
    async fn evaluate_url_encodes_expression() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/7/frames/0/eval"))
            .and(query_param("expr", "new String(1 + 1)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "expression": "new String(1 + 1)",
                "result": "2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = test_client(&server)
            .evaluate(7, 0, "new String(1 + 1)")
            .await
            .unwrap();
        assert_eq!(response.result.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn evaluate_result_field_may_be_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/threads/7/frames/0/eval"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"expression": "void(0)"})),
            )
            .mount(&server)
            .await;

        let response = test_client(&server).evaluate(7, 0, "void(0)").await.unwrap();
        assert!(response.result.is_none());
    }

    #[tokio::test]
    async fn resume_and_stop_hit_per_thread_paths() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/3/resume"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/threads/3/stop"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.resume_thread(3).await.unwrap();
        client.stop_thread(3).await.unwrap();
    }

    #[tokio::test]
    async fn reset_thread_timeout_posts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/threads/reset"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        test_client(&server).reset_thread_timeout().await.unwrap();
    }

    #[tokio::test]
    async fn breakpoints_can_be_reinstalled_after_clearing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/breakpoints"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "breakpoints": [
                    { "id": 1, "line_number": 3, "script_path": "/c/cartridge/controllers/Home.js" }
                ]
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/breakpoints"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let specs = vec![BreakpointSpec {
            line_number: 3,
            script_path: "/c/cartridge/controllers/Home.js".to_string(),
        }];
        assert_eq!(client.create_breakpoints(specs.clone()).await.unwrap().len(), 1);
        client.delete_breakpoints().await.unwrap();
        assert_eq!(client.create_breakpoints(specs).await.unwrap().len(), 1);
    }

    #[test]
    fn for_host_builds_fixed_base_path() {
        let client = DebuggerClient::for_host(
            "dev01-eu-acme.demandware.net",
            "Basic x",
            "snare",
            Duration::from_secs(10),
        );
        assert_eq!(
            client.base_url,
            "https://dev01-eu-acme.demandware.net/s/-/dw/debugger/v2_0"
        );
    }

    #[test]
    fn new_strips_trailing_slash() {
        let client = DebuggerClient::new("http://x/", "a", "c", Duration::from_secs(1));
        assert_eq!(client.base_url, "http://x");
    }
}
