//! Auth storage file I/O.
//!
//! Reads and writes `~/.snare/auth.json` with secure file permissions (0o600).

use std::path::{Path, PathBuf};

use crate::errors::AuthError;
use crate::types::AuthStorage;

/// Default auth file name.
const AUTH_FILE_NAME: &str = "auth.json";

/// Get the auth file path under the given data directory.
pub fn auth_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(AUTH_FILE_NAME)
}

/// Resolve the default data directory (`~/.snare`).
pub fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".snare")
}

/// Load auth storage from file (sync).
///
/// Returns `None` if the file doesn't exist or is invalid.
pub fn load_auth_storage(path: &Path) -> Option<AuthStorage> {
    let data = match std::fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!("failed to read auth file: {e}");
            return None;
        }
    };

    match serde_json::from_str::<AuthStorage>(&data) {
        Ok(storage) if storage.version == 1 => Some(storage),
        Ok(storage) => {
            tracing::warn!("unsupported auth storage version: {}", storage.version);
            None
        }
        Err(e) => {
            tracing::warn!("failed to parse auth file: {e}");
            None
        }
    }
}

/// Save auth storage to file (sync).
///
/// Creates parent directories if needed. Sets file permissions to 0o600.
pub fn save_auth_storage(path: &Path, storage: &mut AuthStorage) -> Result<(), AuthError> {
    storage.last_updated = chrono::Utc::now().to_rfc3339();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(storage)?;
    std::fs::write(path, &json)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        let _ = std::fs::set_permissions(path, perms);
    }

    Ok(())
}

/// Delete the auth file.
pub fn clear_auth(path: &Path) -> Result<(), AuthError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AuthError::Io(e)),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
