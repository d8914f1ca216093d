//! `dw.json` project-file import.
//!
//! The platform ecosystem's tooling conventionally keeps sandbox credentials
//! in a `dw.json` at the project root. snare reads it as the lowest-priority
//! credential source, never writes it.

use std::path::{Path, PathBuf};

use crate::types::DwJson;

/// Default project file name.
const DW_FILE_NAME: &str = "dw.json";

/// Get the `dw.json` path under the given project directory.
pub fn dw_json_path(project_dir: &Path) -> PathBuf {
    project_dir.join(DW_FILE_NAME)
}

/// Load `dw.json` from a specific path.
///
/// Returns `None` if the file doesn't exist or is invalid — the caller falls
/// through to the next credential source either way.
pub fn load_dw_json(path: &Path) -> Option<DwJson> {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("failed to read dw.json: {e}");
            return None;
        }
    };

    match serde_json::from_str::<DwJson>(&data) {
        Ok(dw) => Some(dw),
        Err(e) => {
            tracing::warn!("failed to parse dw.json: {e}");
            None
        }
    }
}

/// Load `dw.json` from the current working directory.
pub fn load_project_dw_json() -> Option<DwJson> {
    let cwd = std::env::current_dir().ok()?;
    load_dw_json(&dw_json_path(&cwd))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
