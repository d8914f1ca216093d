//! Credential resolution with cached Basic headers.
//!
//! Sources, in priority order:
//! 1. **Environment** — `SNARE_USERNAME`/`SNARE_PASSWORD` (and the
//!    `SNARE_STOREFRONT_*` pair for the trigger)
//! 2. **Auth file** — `~/.snare/auth.json`
//! 3. **Project file** — `./dw.json` (Business Manager pair only)
//!
//! Headers are computed once per resolver and cached in write-once cells;
//! the resolver itself is immutable after construction.

use std::path::Path;
use std::sync::OnceLock;

use tracing::debug;

use crate::errors::AuthError;
use crate::storage::load_auth_storage;
use crate::types::{CredentialPair, DwJson};

/// Resolved credentials for one sandbox.
///
/// Holds the Business Manager pair (debugger control, WebDAV probe) and an
/// optional dedicated storefront pair (execution trigger). The storefront
/// header falls back to the Business Manager pair when no dedicated pair is
/// configured.
#[derive(Debug, Default)]
pub struct CredentialResolver {
    primary: CredentialPair,
    storefront: Option<CredentialPair>,
    primary_header: OnceLock<String>,
    storefront_header: OnceLock<String>,
}

impl CredentialResolver {
    /// Build a resolver from already-resolved pairs. Used by tests and by
    /// callers that manage their own sources.
    #[must_use]
    pub fn from_pairs(primary: CredentialPair, storefront: Option<CredentialPair>) -> Self {
        Self {
            primary,
            storefront,
            primary_header: OnceLock::new(),
            storefront_header: OnceLock::new(),
        }
    }

    /// Resolve credentials from the environment, the auth file, and an
    /// optional `dw.json`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] when no source yields a
    /// complete Business Manager pair.
    pub fn resolve(auth_path: &Path, dw: Option<&DwJson>) -> Result<Self, AuthError> {
        let storage = load_auth_storage(auth_path);

        let primary = env_pair("SNARE_USERNAME", "SNARE_PASSWORD")
            .inspect(|_| debug!("using Business Manager credentials from environment"))
            .or_else(|| {
                storage
                    .as_ref()
                    .and_then(|s| s.business_manager.clone())
                    .filter(CredentialPair::is_complete)
                    .inspect(|_| debug!("using Business Manager credentials from auth file"))
            })
            .or_else(|| {
                dw.map(|dw| CredentialPair {
                    username: dw.username.clone(),
                    password: dw.password.clone(),
                })
                .filter(CredentialPair::is_complete)
                .inspect(|_| debug!("using Business Manager credentials from dw.json"))
            })
            .ok_or(AuthError::MissingCredentials)?;

        let storefront = env_pair("SNARE_STOREFRONT_USERNAME", "SNARE_STOREFRONT_PASSWORD")
            .or_else(|| {
                storage
                    .as_ref()
                    .and_then(|s| s.storefront.clone())
                    .filter(CredentialPair::is_complete)
            });

        Ok(Self::from_pairs(primary, storefront))
    }

    /// Basic header for debugger-control and WebDAV calls. Computed once.
    pub fn debugger_header(&self) -> &str {
        self.primary_header
            .get_or_init(|| self.primary.basic_header())
    }

    /// Basic header for the storefront trigger. Prefers the dedicated
    /// storefront pair, else the Business Manager pair. Computed once.
    pub fn storefront_header(&self) -> &str {
        self.storefront_header.get_or_init(|| {
            self.storefront
                .as_ref()
                .unwrap_or(&self.primary)
                .basic_header()
        })
    }

    /// Whether a dedicated storefront pair is configured.
    #[must_use]
    pub fn has_storefront_pair(&self) -> bool {
        self.storefront.is_some()
    }
}

/// Read a credential pair from two env vars; both must be non-empty.
fn env_pair(user_var: &str, pass_var: &str) -> Option<CredentialPair> {
    let username = std::env::var(user_var).ok().filter(|v| !v.is_empty())?;
    let password = std::env::var(pass_var).ok().filter(|v| !v.is_empty())?;
    Some(CredentialPair { username, password })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
