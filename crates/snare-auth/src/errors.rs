//! Auth error types.

/// Errors that can occur during credential operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No usable credentials found in any source.
    #[error(
        "no credentials configured — set SNARE_USERNAME/SNARE_PASSWORD, \
         write ~/.snare/auth.json, or place a dw.json in the project directory"
    )]
    MissingCredentials,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = AuthError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn missing_credentials_display() {
        let err = AuthError::MissingCredentials;
        assert!(err.to_string().contains("dw.json"));
        assert!(err.to_string().contains("SNARE_USERNAME"));
    }
}
