//! Storefront execution trigger.
//!
//! Breakpoints only fire when the server actually executes the controller,
//! so after installing them we issue a cheap `Home-Show` request. The
//! request is expected to hang while the controller is halted at a
//! breakpoint, which means a timeout here is the success signal.

use std::time::Duration;

use tracing::{debug, warn};

/// What a trigger attempt amounted to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The request timed out, which is what a halted controller looks like.
    PresumedHalted,
    /// The request finished with a success status before any breakpoint hit.
    Completed(u16),
    /// The request failed outright, on both the bare and locale-qualified
    /// route.
    Failed(String),
}

/// Strip a `Sites-…-Site` wrapper so callers can pass either form.
pub fn normalize_site_id(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("Sites-")
        .and_then(|rest| rest.strip_suffix("-Site"))
        .unwrap_or(trimmed)
        .to_string()
}

/// Trim whitespace and slashes from a locale, falling back to the default.
pub fn normalize_locale(raw: Option<&str>, default_locale: &str) -> String {
    let candidate = raw.unwrap_or(default_locale);
    let cleaned = candidate.trim().trim_matches('/');
    if cleaned.is_empty() {
        default_locale.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Fires `Home-Show` storefront requests to drive execution into installed
/// breakpoints.
pub struct ExecutionTrigger {
    http: reqwest::Client,
    base_url: String,
    auth_header: String,
    timeout: Duration,
    default_locale: String,
}

impl ExecutionTrigger {
    /// `base_url` is the `…/on/demandware.store` prefix without a trailing
    /// slash.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        auth_header: impl Into<String>,
        timeout: Duration,
        default_locale: impl Into<String>,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http,
            base_url,
            auth_header: auth_header.into(),
            timeout,
            default_locale: default_locale.into(),
        }
    }

    fn route_url(&self, site_id: &str, locale: Option<&str>) -> String {
        match locale {
            Some(locale) => format!(
                "{}/Sites-{site_id}-Site/{locale}/Home-Show",
                self.base_url
            ),
            None => format!("{}/Sites-{site_id}-Site/Home-Show", self.base_url),
        }
    }

    async fn attempt(&self, url: &str) -> TriggerOutcome {
        let request = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .send();
        match tokio::time::timeout(self.timeout, request).await {
            // Hanging is the goal: the controller is halted at a breakpoint.
            Err(_) => TriggerOutcome::PresumedHalted,
            Ok(Err(error)) if error.is_timeout() => TriggerOutcome::PresumedHalted,
            Ok(Err(error)) => TriggerOutcome::Failed(error.to_string()),
            Ok(Ok(response)) => {
                let status = response.status();
                if status.is_success() {
                    TriggerOutcome::Completed(status.as_u16())
                } else {
                    TriggerOutcome::Failed(format!("storefront responded {status}"))
                }
            }
        }
    }

    /// Fire the trigger: bare route first, and on a clean failure exactly
    /// one locale-qualified retry. Timeouts and completions never retry.
    pub async fn fire(&self, site_id: &str, locale: Option<&str>) -> TriggerOutcome {
        let site_id = normalize_site_id(site_id);
        let bare_url = self.route_url(&site_id, None);
        debug!(url = %bare_url, "firing storefront trigger");
        let first = self.attempt(&bare_url).await;
        match first {
            TriggerOutcome::PresumedHalted | TriggerOutcome::Completed(_) => first,
            TriggerOutcome::Failed(ref reason) => {
                let locale = normalize_locale(locale, &self.default_locale);
                let retry_url = self.route_url(&site_id, Some(&locale));
                warn!(%reason, url = %retry_url, "bare trigger failed, retrying with locale");
                self.attempt(&retry_url).await
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
