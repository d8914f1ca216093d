//! # snare-settings
//!
//! Configuration management with layered sources for snare.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`SnareSettings::default()`]
//! 2. **User file** — `~/.snare/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `SNARE_*` overrides (highest priority)
//!
//! The sandbox hostname and site id have no sensible compiled default; they
//! must come from the settings file, the environment, or `dw.json` (resolved
//! in `snare-auth`).
//!
//! # Usage
//!
//! ```no_run
//! use snare_settings::get_settings;
//!
//! let settings = get_settings();
//! println!("poll interval: {}ms", settings.debugger.poll_interval_ms);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

/// Global settings singleton.
///
/// Initialized on first access via [`get_settings`]. Loaded from
/// `~/.snare/settings.json` with env var overrides, or falls back to
/// compiled defaults if loading fails.
static SETTINGS: OnceLock<SnareSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// On first call, loads settings from `~/.snare/settings.json` with env var
/// overrides. On subsequent calls, returns the cached value. If loading
/// fails, returns compiled defaults.
pub fn get_settings() -> &'static SnareSettings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

/// Initialize the global settings with a specific value.
///
/// # Errors
///
/// Returns the provided settings back if the global was already initialized.
pub fn init_settings(settings: SnareSettings) -> std::result::Result<(), SnareSettings> {
    SETTINGS.set(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
