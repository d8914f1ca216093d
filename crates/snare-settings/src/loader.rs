//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`SnareSettings::default()`]
//! 2. If `~/.snare/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::SnareSettings;

/// Resolve the path to the settings file (`~/.snare/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".snare").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<SnareSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<SnareSettings> {
    let defaults = serde_json::to_value(SnareSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: SnareSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Each env var has strict parsing rules:
/// - Integers must be valid and within the specified range
/// - Invalid values are ignored with a warning (fall back to file/default)
pub fn apply_env_overrides(settings: &mut SnareSettings) {
    // ── Sandbox ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string("SNARE_HOSTNAME") {
        settings.sandbox.hostname = v;
    }
    if let Some(v) = read_env_string("SNARE_SITE_ID") {
        settings.sandbox.site_id = v;
    }
    if let Some(v) = read_env_string("SNARE_CODE_VERSION") {
        settings.sandbox.code_version = v;
    }

    // ── Debugger ────────────────────────────────────────────────────
    if let Some(v) = read_env_string("SNARE_CLIENT_ID") {
        settings.debugger.client_id = v;
    }
    if let Some(v) = read_env_u64("SNARE_CALL_TIMEOUT_MS", 100, 600_000) {
        settings.debugger.call_timeout_ms = v;
    }
    if let Some(v) = read_env_u64("SNARE_POLL_INTERVAL_MS", 50, 60_000) {
        settings.debugger.poll_interval_ms = v;
    }

    // ── Trigger ─────────────────────────────────────────────────────
    if let Some(v) = read_env_u64("SNARE_TRIGGER_TIMEOUT_MS", 100, 600_000) {
        settings.trigger.timeout_ms = v;
    }
    if let Some(v) = read_env_string("SNARE_DEFAULT_LOCALE") {
        settings.trigger.default_locale = v;
    }

    // ── Cartridge / evaluation ──────────────────────────────────────
    if let Some(v) = read_env_u32("SNARE_SCAN_LINES", 1, 1000) {
        settings.cartridge.scan_lines = v;
    }
    if let Some(v) = read_env_u64("SNARE_EVAL_TIMEOUT_MS", 1000, 3_600_000) {
        settings.evaluation.default_timeout_ms = v;
    }
    if let Some(v) = read_env_string("SNARE_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_simple_override() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": 10});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 10);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({
            "debugger": {"callTimeoutMs": 10000, "pollIntervalMs": 500}
        });
        let source = serde_json::json!({
            "debugger": {"pollIntervalMs": 250}
        });
        let merged = deep_merge(target, source);
        assert_eq!(merged["debugger"]["pollIntervalMs"], 250);
        assert_eq!(merged["debugger"]["callTimeoutMs"], 10000);
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4, 5]});
        let merged = deep_merge(target, source);
        assert_eq!(merged["items"], serde_json::json!([4, 5]));
    }

    #[test]
    fn merge_new_keys_added() {
        let target = serde_json::json!({"a": 1});
        let source = serde_json::json!({"b": 2});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let source = serde_json::json!({"a": 42});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 42);
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let path = Path::new("/nonexistent/settings.json");
        let settings = load_settings_from_path(path).unwrap();
        let defaults = SnareSettings::default();
        assert_eq!(settings.version, defaults.version);
        assert_eq!(
            settings.debugger.call_timeout_ms,
            defaults.debugger.call_timeout_ms
        );
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"sandbox": {"hostname": "dev01.demandware.net", "siteId": "RefArch"}, "debugger": {"pollIntervalMs": 100}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.sandbox.hostname, "dev01.demandware.net");
        assert_eq!(settings.sandbox.site_id, "RefArch");
        assert_eq!(settings.debugger.poll_interval_ms, 100);
        assert_eq!(settings.debugger.call_timeout_ms, 10_000);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = load_settings_from_path(&path);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), SettingsError::Json(_)));
    }

    #[test]
    fn load_empty_json_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{}").unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.cartridge.scan_lines, 50);
    }

    // ── parse helpers ───────────────────────────────────────────────

    #[test]
    fn parse_u64_valid() {
        assert_eq!(parse_u64_range("30000", 1000, 600_000), Some(30_000));
        assert_eq!(parse_u64_range("1000", 1000, 600_000), Some(1000));
    }

    #[test]
    fn parse_u64_out_of_range() {
        assert_eq!(parse_u64_range("500", 1000, 600_000), None);
        assert_eq!(parse_u64_range("700000", 1000, 600_000), None);
    }

    #[test]
    fn parse_u64_invalid() {
        assert_eq!(parse_u64_range("abc", 1000, 600_000), None);
        assert_eq!(parse_u64_range("", 1000, 600_000), None);
    }

    #[test]
    fn parse_u32_valid() {
        assert_eq!(parse_u32_range("50", 1, 1000), Some(50));
    }

    #[test]
    fn parse_u32_out_of_range() {
        assert_eq!(parse_u32_range("0", 1, 1000), None);
        assert_eq!(parse_u32_range("2000", 1, 1000), None);
    }
}
