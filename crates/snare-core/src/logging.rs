//! Structured logging with `tracing`.
//!
//! All crates in the workspace log through `tracing`. The subscriber writes
//! compact human-readable output to stderr; `RUST_LOG` overrides the level
//! passed by the caller. Protocol-level exchanges (breakpoint installs, poll
//! iterations, trigger outcomes) log at `debug`, evaluation lifecycle events
//! at `info`, swallowed cleanup errors at `warn`.

/// Initialize the global tracing subscriber with stderr output.
///
/// Call once at application startup. Subsequent calls are no-ops.
///
/// # Arguments
///
/// * `level` - Minimum log level to display. Defaults to `"warn"`.
pub fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // try_init is a no-op if a subscriber is already set
    let _ = subscriber.try_init();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
