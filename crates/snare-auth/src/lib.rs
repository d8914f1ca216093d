//! # snare-auth
//!
//! Sandbox credential storage and Basic-auth header resolution.
//!
//! Two independent authorization headers are derived from configuration:
//! - **Debugger header** — Business Manager pair, sent on every
//!   debugger-control and WebDAV call.
//! - **Storefront header** — dedicated storefront pair when configured,
//!   else the Business Manager pair, sent on the execution trigger.
//!
//! Credential sources in priority order: `SNARE_*` env vars,
//! `~/.snare/auth.json` (0o600, version-checked), project `dw.json`.
//!
//! # Example
//!
//! ```no_run
//! use snare_auth::{CredentialResolver, dwjson, storage};
//!
//! let dw = dwjson::load_project_dw_json();
//! let auth_path = storage::auth_file_path(&storage::data_dir());
//! let resolver = CredentialResolver::resolve(&auth_path, dw.as_ref()).unwrap();
//! let header = resolver.debugger_header();
//! ```

#![deny(unsafe_code)]

pub mod dwjson;
pub mod errors;
pub mod resolver;
pub mod storage;
pub mod types;

pub use errors::AuthError;
pub use resolver::CredentialResolver;
pub use storage::{auth_file_path, data_dir, load_auth_storage, save_auth_storage};
pub use types::{AuthStorage, CredentialPair, DwJson};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
