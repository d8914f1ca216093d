//! Fault classification and guidance hints.
//!
//! Every failed evaluation carries a short list of hints pointing at the
//! likely misconfiguration (credentials, permissions, the client-id header,
//! timeouts). Classification prefers the structured fault `type` reported by
//! the debugger control API and falls back to message-substring matching for
//! transport errors and free-text faults.

use serde::{Deserialize, Serialize};
use tracing::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Category of a failed debugger interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCategory {
    /// Rejected Business Manager credentials.
    Credentials,
    /// Authenticated but not permitted (missing Script Debugger role).
    Permission,
    /// Missing or rejected `x-dw-client-id` header.
    ClientId,
    /// The debug session is owned by another client.
    Contention,
    /// A budget lapsed before the remote halted.
    Timeout,
    /// No usable storefront cartridge on the code version.
    Cartridge,
    /// The server accepted none of the candidate breakpoints.
    Breakpoint,
    /// Network-level failure reaching the sandbox.
    Network,
    /// Unrecognized failure.
    Unknown,
}

impl std::fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credentials => write!(f, "credentials"),
            Self::Permission => write!(f, "permission"),
            Self::ClientId => write!(f, "client_id"),
            Self::Contention => write!(f, "contention"),
            Self::Timeout => write!(f, "timeout"),
            Self::Cartridge => write!(f, "cartridge"),
            Self::Breakpoint => write!(f, "breakpoint"),
            Self::Network => write!(f, "network"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pattern matching
// ─────────────────────────────────────────────────────────────────────────────

struct GuidancePattern {
    check: fn(&str) -> bool,
    category: FaultCategory,
}

/// Known message patterns, checked in order. Most specific first: the
/// contention and header phrases are unambiguous, the status-code checks are
/// not.
fn patterns() -> &'static [GuidancePattern] {
    static PATTERNS: &[GuidancePattern] = &[
        // Session contention
        GuidancePattern {
            check: |s| {
                let lower = s.to_lowercase();
                lower.contains("already enabled") || lower.contains("in use")
            },
            category: FaultCategory::Contention,
        },
        // Client-id header
        GuidancePattern {
            check: |s| {
                let lower = s.to_lowercase();
                lower.contains("client id") || lower.contains("x-dw-client-id")
            },
            category: FaultCategory::ClientId,
        },
        // Credentials
        GuidancePattern {
            check: |s| s.contains("401"),
            category: FaultCategory::Credentials,
        },
        GuidancePattern {
            check: |s| {
                let lower = s.to_lowercase();
                lower.contains("unauthorized") || lower.contains("authentication")
            },
            category: FaultCategory::Credentials,
        },
        // Permission
        GuidancePattern {
            check: |s| s.contains("403"),
            category: FaultCategory::Permission,
        },
        GuidancePattern {
            check: |s| {
                let lower = s.to_lowercase();
                lower.contains("forbidden") || lower.contains("access denied")
            },
            category: FaultCategory::Permission,
        },
        // Cartridge resolution
        GuidancePattern {
            check: |s| s.to_lowercase().contains("cartridge"),
            category: FaultCategory::Cartridge,
        },
        // Breakpoint installation
        GuidancePattern {
            check: |s| s.to_lowercase().contains("breakpoint"),
            category: FaultCategory::Breakpoint,
        },
        // Timeouts
        GuidancePattern {
            check: |s| {
                let lower = s.to_lowercase();
                lower.contains("timeout") || lower.contains("timed out")
            },
            category: FaultCategory::Timeout,
        },
        // Network
        GuidancePattern {
            check: |s| {
                let lower = s.to_lowercase();
                lower.contains("connection refused")
                    || lower.contains("error sending request")
                    || lower.contains("dns error")
                    || lower.contains("connect")
            },
            category: FaultCategory::Network,
        },
    ];
    PATTERNS
}

/// Map a structured fault `type` from the control API to a category.
///
/// Fault type names are matched loosely by fragment so minor renames across
/// platform versions still classify.
fn fault_type_category(fault_type: &str) -> Option<FaultCategory> {
    if fault_type.contains("AlreadyEnabled") || fault_type.contains("InUse") {
        Some(FaultCategory::Contention)
    } else if fault_type.contains("ClientId") {
        Some(FaultCategory::ClientId)
    } else if fault_type.contains("Unauthorized") || fault_type.contains("Authentication") {
        Some(FaultCategory::Credentials)
    } else if fault_type.contains("AccessDenied")
        || fault_type.contains("Forbidden")
        || fault_type.contains("Authorization")
    {
        Some(FaultCategory::Permission)
    } else if fault_type.contains("Timeout") {
        Some(FaultCategory::Timeout)
    } else {
        None
    }
}

/// One hint per category, phrased for the person holding the failing result.
fn category_hint(category: FaultCategory) -> &'static str {
    match category {
        FaultCategory::Credentials => {
            "Check the Business Manager username/password (dw.json or ~/.snare/auth.json)"
        }
        FaultCategory::Permission => {
            "The account authenticated but lacks the Script Debugger permission in Business Manager"
        }
        FaultCategory::ClientId => {
            "The server rejected the x-dw-client-id header; set debugger.clientId in settings"
        }
        FaultCategory::Contention => {
            "Another client owns the debug session; takeover is automatic, so a repeat usually means a stuck external debugger"
        }
        FaultCategory::Timeout => {
            "No execution halted in time; raise the timeout, or check that the site id is correct and the storefront is reachable"
        }
        FaultCategory::Cartridge => {
            "Deploy a storefront cartridge (app_storefront_base or app_storefront_controllers) to the active code version, or pass an explicit script path"
        }
        FaultCategory::Breakpoint => {
            "The server accepted none of the candidate lines; pass an explicit script path and line"
        }
        FaultCategory::Network => {
            "Could not reach the sandbox; check the hostname and your connection"
        }
        FaultCategory::Unknown => {
            "Re-run with RUST_LOG=snare=debug for the full protocol exchange"
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Classify a failure from its structured fault type (when the control API
/// supplied one) and its message.
#[must_use]
pub fn classify(fault_type: Option<&str>, message: &str) -> FaultCategory {
    if let Some(category) = fault_type.and_then(fault_type_category) {
        return category;
    }
    if let Some(fault_type) = fault_type {
        debug!(fault_type, "fault type not recognized, matching on message");
    }
    let category = patterns()
        .iter()
        .find(|p| (p.check)(message))
        .map_or(FaultCategory::Unknown, |p| p.category);
    if category == FaultCategory::Unknown {
        debug!(message, "no guidance pattern matched");
    }
    category
}

/// Whether a fault means the debug session belongs to another client.
#[must_use]
pub fn is_contention(fault_type: Option<&str>, message: &str) -> bool {
    classify(fault_type, message) == FaultCategory::Contention
}

/// Build the guidance hint list for a failure.
///
/// The structured fault type's hint comes first, then one hint per matching
/// message pattern (each category at most once). Never empty: unrecognized
/// failures get the generic debug-logging hint.
#[must_use]
pub fn guidance_hints(fault_type: Option<&str>, message: &str) -> Vec<String> {
    let mut seen: Vec<FaultCategory> = Vec::new();
    let mut hints: Vec<String> = Vec::new();

    if let Some(category) = fault_type.and_then(fault_type_category) {
        seen.push(category);
        hints.push(category_hint(category).to_owned());
    }

    for pattern in patterns() {
        if (pattern.check)(message) && !seen.contains(&pattern.category) {
            seen.push(pattern.category);
            hints.push(category_hint(pattern.category).to_owned());
        }
    }

    if hints.is_empty() {
        hints.push(category_hint(FaultCategory::Unknown).to_owned());
    }
    hints
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
