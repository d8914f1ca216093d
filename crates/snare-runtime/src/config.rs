//! Evaluator configuration.
//!
//! [`EvaluatorConfig`] carries fully-resolved URLs, headers, and budgets.
//! [`EvaluatorConfig::from_settings`] builds one from the layered settings
//! plus resolved credentials; tests build configs directly against mock
//! server URIs.

use std::time::Duration;

use snare_auth::CredentialResolver;
use snare_settings::SnareSettings;

use crate::errors::EvalError;

/// Storefront route base path, fixed per host.
const STOREFRONT_BASE_PATH: &str = "/on/demandware.store";

/// WebDAV cartridge tree base path, fixed per host.
const WEBDAV_CARTRIDGE_PATH: &str = "/on/demandware.servlet/webdav/Sites/Cartridges";

/// Everything the evaluator needs, fully resolved.
#[derive(Clone, Debug)]
pub struct EvaluatorConfig {
    /// Debugger control base URL (includes the fixed API base path).
    pub debugger_base_url: String,
    /// Storefront base URL the trigger builds site routes under.
    pub storefront_base_url: String,
    /// WebDAV base URL the cartridge probe checks under.
    pub webdav_base_url: String,
    /// Default site id for the trigger.
    pub site_id: String,
    /// Active code version the probe is keyed by.
    pub code_version: String,
    /// `x-dw-client-id` header value.
    pub client_id: String,
    /// Basic header for debugger-control and WebDAV calls.
    pub debugger_auth: String,
    /// Basic header for the storefront trigger.
    pub storefront_auth: String,
    /// Per-call budget for debugger-control calls.
    pub call_timeout: Duration,
    /// Budget for the trigger request (shorter than the poll budget).
    pub trigger_timeout: Duration,
    /// Sleep between halt-poll iterations.
    pub poll_interval: Duration,
    /// Overall halt-poll budget when the request supplies none.
    pub default_eval_timeout: Duration,
    /// Locale used when the request supplies none.
    pub default_locale: String,
    /// Leading controller lines covered by the strategic breakpoint set.
    pub scan_lines: u32,
}

impl EvaluatorConfig {
    /// Build a config from settings and resolved credentials.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Configuration`] when the sandbox hostname, site
    /// id, or code version is missing — none have a usable default.
    pub fn from_settings(
        settings: &SnareSettings,
        credentials: &CredentialResolver,
    ) -> Result<Self, EvalError> {
        let hostname = required(&settings.sandbox.hostname, "sandbox hostname")?;
        let site_id = required(&settings.sandbox.site_id, "site id")?;
        let code_version = required(&settings.sandbox.code_version, "code version")?;

        Ok(Self {
            debugger_base_url: format!("https://{hostname}/s/-/dw/debugger/v2_0"),
            storefront_base_url: format!("https://{hostname}{STOREFRONT_BASE_PATH}"),
            webdav_base_url: format!("https://{hostname}{WEBDAV_CARTRIDGE_PATH}"),
            site_id,
            code_version,
            client_id: settings.debugger.client_id.clone(),
            debugger_auth: credentials.debugger_header().to_string(),
            storefront_auth: credentials.storefront_header().to_string(),
            call_timeout: Duration::from_millis(settings.debugger.call_timeout_ms),
            trigger_timeout: Duration::from_millis(settings.trigger.timeout_ms),
            poll_interval: Duration::from_millis(settings.debugger.poll_interval_ms),
            default_eval_timeout: Duration::from_millis(settings.evaluation.default_timeout_ms),
            default_locale: settings.trigger.default_locale.clone(),
            scan_lines: settings.cartridge.scan_lines,
        })
    }
}

fn required(value: &str, what: &str) -> Result<String, EvalError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EvalError::Configuration(format!(
            "{what} is not set — configure it in ~/.snare/settings.json or the environment"
        )));
    }
    Ok(trimmed.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use snare_auth::CredentialPair;

    fn test_credentials() -> CredentialResolver {
        CredentialResolver::from_pairs(
            CredentialPair {
                username: "admin".into(),
                password: "secret".into(),
            },
            None,
        )
    }

    fn configured_settings() -> SnareSettings {
        let mut settings = SnareSettings::default();
        settings.sandbox.hostname = "dev01-eu-acme.demandware.net".into();
        settings.sandbox.site_id = "RefArch".into();
        settings.sandbox.code_version = "version1".into();
        settings
    }

    #[test]
    fn from_settings_builds_fixed_base_paths() {
        let config = EvaluatorConfig::from_settings(&configured_settings(), &test_credentials())
            .unwrap();
        assert_eq!(
            config.debugger_base_url,
            "https://dev01-eu-acme.demandware.net/s/-/dw/debugger/v2_0"
        );
        assert_eq!(
            config.storefront_base_url,
            "https://dev01-eu-acme.demandware.net/on/demandware.store"
        );
        assert!(config.webdav_base_url.ends_with("/webdav/Sites/Cartridges"));
        assert_eq!(config.scan_lines, 50);
    }

    #[test]
    fn missing_hostname_is_configuration_error() {
        let mut settings = configured_settings();
        settings.sandbox.hostname = "  ".into();
        let err = EvaluatorConfig::from_settings(&settings, &test_credentials()).unwrap_err();
        assert!(matches!(err, EvalError::Configuration(_)));
        assert!(err.to_string().contains("hostname"));
    }

    #[test]
    fn missing_site_id_is_configuration_error() {
        let mut settings = configured_settings();
        settings.sandbox.site_id = String::new();
        let err = EvaluatorConfig::from_settings(&settings, &test_credentials()).unwrap_err();
        assert!(err.to_string().contains("site id"));
    }

    #[test]
    fn storefront_auth_falls_back_to_primary() {
        let config = EvaluatorConfig::from_settings(&configured_settings(), &test_credentials())
            .unwrap();
        assert_eq!(config.debugger_auth, config.storefront_auth);
    }
}
