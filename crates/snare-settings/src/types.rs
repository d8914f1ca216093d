//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON file
//! format, and `#[serde(default)]` so partial files are valid — missing
//! fields get their default value during deserialization.

use serde::{Deserialize, Serialize};

/// Root settings type for snare.
///
/// Loaded from `~/.snare/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values.
///
/// # JSON Format
///
/// All field names are camelCase. Example:
///
/// ```json
/// {
///   "sandbox": { "hostname": "dev01-eu-acme.demandware.net", "siteId": "RefArch" },
///   "debugger": { "pollIntervalMs": 250 }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnareSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// Target sandbox (hostname, site, code version).
    pub sandbox: SandboxSettings,
    /// Script Debugger API settings.
    pub debugger: DebuggerSettings,
    /// Storefront execution-trigger settings.
    pub trigger: TriggerSettings,
    /// Cartridge auto-detection settings.
    pub cartridge: CartridgeSettings,
    /// Evaluation budgets.
    pub evaluation: EvaluationSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for SnareSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "snare".to_string(),
            sandbox: SandboxSettings::default(),
            debugger: DebuggerSettings::default(),
            trigger: TriggerSettings::default(),
            cartridge: CartridgeSettings::default(),
            evaluation: EvaluationSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Target sandbox identification.
///
/// There is no sensible compiled default for any of these; empty values mean
/// "not configured" and surface as a configuration error when the evaluator
/// is built.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SandboxSettings {
    /// Sandbox hostname (e.g., `dev01-eu-acme.demandware.net`).
    pub hostname: String,
    /// Site id for the storefront trigger. Accepts the bare id or the
    /// wrapped `Sites-{id}-Site` form.
    pub site_id: String,
    /// Active code version the cartridge probe is keyed by.
    pub code_version: String,
}

/// Script Debugger API settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DebuggerSettings {
    /// Value for the `x-dw-client-id` header on every control call.
    pub client_id: String,
    /// Per-call budget for debugger-control calls (milliseconds).
    pub call_timeout_ms: u64,
    /// Sleep between halt-poll iterations (milliseconds).
    pub poll_interval_ms: u64,
}

impl Default for DebuggerSettings {
    fn default() -> Self {
        Self {
            client_id: "snare".to_string(),
            call_timeout_ms: 10_000,
            poll_interval_ms: 500,
        }
    }
}

/// Storefront execution-trigger settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerSettings {
    /// Budget for the trigger request (milliseconds). Deliberately shorter
    /// than the halt-poll budget: a trigger that halts at a breakpoint looks
    /// like a hang, and the timeout is the success signal.
    pub timeout_ms: u64,
    /// Locale used when the request supplies none.
    pub default_locale: String,
}

impl Default for TriggerSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            default_locale: "default".to_string(),
        }
    }
}

/// Cartridge auto-detection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartridgeSettings {
    /// How many leading controller lines get candidate breakpoints when no
    /// explicit line is given. The first executable statement varies across
    /// platform versions, so the whole prefix is covered.
    pub scan_lines: u32,
}

impl Default for CartridgeSettings {
    fn default() -> Self {
        Self { scan_lines: 50 }
    }
}

/// Evaluation budgets.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationSettings {
    /// Overall halt-poll budget when the request supplies no timeout
    /// (milliseconds).
    pub default_timeout_ms: u64,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            default_timeout_ms: 30_000,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level for stderr output (`RUST_LOG` overrides).
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
