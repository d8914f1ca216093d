//! Credential type definitions.
//!
//! Two independent credential pairs exist:
//! - **Business Manager** — authorizes debugger-control and WebDAV calls.
//! - **Storefront** — authorizes the execution-trigger request when the
//!   storefront is protected separately; falls back to the Business Manager
//!   pair when absent. OAuth-style client credentials are never used for the
//!   trigger: the storefront route does not understand them.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// A username/password pair used to build a Basic-auth header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPair {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl CredentialPair {
    /// Build the `Authorization: Basic …` header value for this pair.
    #[must_use]
    pub fn basic_header(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.username, self.password));
        format!("Basic {encoded}")
    }

    /// Whether both fields are non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// On-disk auth storage (`~/.snare/auth.json`).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStorage {
    /// Storage schema version. Only version 1 is supported.
    pub version: u32,
    /// Business Manager credential pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_manager: Option<CredentialPair>,
    /// Dedicated storefront credential pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storefront: Option<CredentialPair>,
    /// RFC3339 timestamp of the last write.
    pub last_updated: String,
}

impl AuthStorage {
    /// Create an empty version-1 storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: 1,
            business_manager: None,
            storefront: None,
            last_updated: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl Default for AuthStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// The ecosystem's conventional per-project credential file (`dw.json`).
///
/// Only the fields snare consumes are modeled; unknown fields are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DwJson {
    /// Sandbox hostname.
    #[serde(default)]
    pub hostname: String,
    /// Business Manager username.
    #[serde(default)]
    pub username: String,
    /// Business Manager password.
    #[serde(default)]
    pub password: String,
    /// Active code version, when the project pins one.
    #[serde(default, rename = "code-version")]
    pub code_version: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
