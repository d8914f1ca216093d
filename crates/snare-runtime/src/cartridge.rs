//! Cartridge detection and breakpoint placement.
//!
//! Expressions run inside whatever halts the storefront controller, so the
//! breakpoint set has to land in a controller file that actually exists on
//! the active code version. The probe checks the WebDAV cartridge tree for
//! the SFRA base cartridge first, then the legacy SiteGenesis one; an
//! explicit script path in the request bypasses detection entirely.

use async_trait::async_trait;
use tracing::{debug, warn};

use snare_sdapi::{BreakpointSpec, SdapiError};

use crate::errors::EvalError;
use crate::types::EvaluationOptions;

/// SFRA base cartridge, probed first.
const SFRA_CARTRIDGE: &str = "app_storefront_base";

/// SiteGenesis controllers cartridge, probed second.
const SITEGENESIS_CARTRIDGE: &str = "app_storefront_controllers";

/// Controller file the breakpoints land in, relative to the cartridge root.
const HOME_CONTROLLER: &str = "cartridge/controllers/Home.js";

/// Where the strategic breakpoint set will be installed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BreakpointTarget {
    /// SFRA `Home.js` controller.
    Sfra {
        /// Line numbers to install.
        lines: Vec<u32>,
    },
    /// SiteGenesis `Home.js` controller.
    SiteGenesis {
        /// Line numbers to install.
        lines: Vec<u32>,
    },
    /// Caller-supplied script path, skipping detection.
    Override {
        /// Absolute server path of the script.
        script_path: String,
        /// Line numbers to install.
        lines: Vec<u32>,
    },
}

impl BreakpointTarget {
    /// Absolute script path on the server.
    pub fn script_path(&self) -> String {
        match self {
            Self::Sfra { .. } => format!("/{SFRA_CARTRIDGE}/{HOME_CONTROLLER}"),
            Self::SiteGenesis { .. } => format!("/{SITEGENESIS_CARTRIDGE}/{HOME_CONTROLLER}"),
            Self::Override { script_path, .. } => {
                if script_path.starts_with('/') {
                    script_path.clone()
                } else {
                    format!("/{script_path}")
                }
            }
        }
    }

    /// Line numbers to install at [`script_path`](Self::script_path).
    pub fn lines(&self) -> &[u32] {
        match self {
            Self::Sfra { lines } | Self::SiteGenesis { lines } | Self::Override { lines, .. } => {
                lines
            }
        }
    }

    /// Short name for logs.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Sfra { .. } => "sfra",
            Self::SiteGenesis { .. } => "sitegenesis",
            Self::Override { .. } => "override",
        }
    }

    /// The full breakpoint batch for one install call.
    pub fn breakpoint_specs(&self) -> Vec<BreakpointSpec> {
        let script_path = self.script_path();
        self.lines()
            .iter()
            .map(|&line_number| BreakpointSpec {
                line_number,
                script_path: script_path.clone(),
            })
            .collect()
    }
}

/// Checks whether a cartridge's `Home.js` controller exists on the server.
#[async_trait]
pub trait CartridgeProbe: Send + Sync {
    /// `Ok(true)` when the controller file is present, `Ok(false)` when the
    /// server answered with a non-success status, `Err` on transport failure.
    async fn controller_exists(&self, cartridge: &str) -> Result<bool, SdapiError>;
}

/// Probe backed by a `HEAD` against the WebDAV cartridge tree.
pub struct WebDavProbe {
    http: reqwest::Client,
    base_url: String,
    auth_header: String,
    code_version: String,
}

impl WebDavProbe {
    /// `base_url` is the `…/webdav/Sites/Cartridges` prefix without a
    /// trailing slash.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        auth_header: impl Into<String>,
        code_version: impl Into<String>,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http,
            base_url,
            auth_header: auth_header.into(),
            code_version: code_version.into(),
        }
    }
}

#[async_trait]
impl CartridgeProbe for WebDavProbe {
    async fn controller_exists(&self, cartridge: &str) -> Result<bool, SdapiError> {
        let url = format!(
            "{}/{}/{cartridge}/{HOME_CONTROLLER}",
            self.base_url, self.code_version
        );
        let response = self
            .http
            .head(&url)
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}

/// The strategic line set: every leading line of the controller, so that at
/// least one lands on executable code regardless of header comments.
pub fn strategic_lines(scan_lines: u32) -> Vec<u32> {
    (1..=scan_lines.max(1)).collect()
}

/// Decide where breakpoints go for one evaluation.
///
/// An explicit `script_path` in the options wins outright; otherwise the
/// probe tries SFRA then SiteGenesis. A probe transport error counts as
/// not-found so a flaky WebDAV endpoint degrades to the next candidate.
///
/// # Errors
///
/// [`EvalError::NoCartridge`] when neither known cartridge has the
/// controller.
pub async fn resolve_target(
    options: &EvaluationOptions,
    probe: &dyn CartridgeProbe,
    scan_lines: u32,
    code_version: &str,
) -> Result<BreakpointTarget, EvalError> {
    if let Some(script_path) = &options.script_path {
        let lines = match options.line {
            Some(line) => vec![line],
            None => strategic_lines(scan_lines),
        };
        return Ok(BreakpointTarget::Override {
            script_path: script_path.clone(),
            lines,
        });
    }

    for (cartridge, is_sfra) in [
        (SFRA_CARTRIDGE, true),
        (SITEGENESIS_CARTRIDGE, false),
    ] {
        match probe.controller_exists(cartridge).await {
            Ok(true) => {
                debug!(cartridge, "controller found");
                let lines = strategic_lines(scan_lines);
                return Ok(if is_sfra {
                    BreakpointTarget::Sfra { lines }
                } else {
                    BreakpointTarget::SiteGenesis { lines }
                });
            }
            Ok(false) => debug!(cartridge, "controller absent"),
            Err(error) => warn!(cartridge, %error, "cartridge probe failed"),
        }
    }

    Err(EvalError::NoCartridge {
        code_version: code_version.to_string(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
