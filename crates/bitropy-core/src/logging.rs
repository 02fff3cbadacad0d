//! Diagnostic logging for bitropy.
//!
//! All diagnostics go through `tracing` to stderr so they never mix with
//! the entropy report on stdout. The CLI's repeatable `-v` flag picks the
//! default level; the `RUST_LOG` environment variable overrides it with a
//! full filter expression.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt};

/// Global flag to track if logging has been initialized
static LOGGING_INITIALIZED: OnceLock<bool> = OnceLock::new();

/// Error type for logging initialization
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("logging already initialized")]
    AlreadyInitialized,

    #[error("failed to set global subscriber: {0}")]
    SetSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Default level filter for a `-v` count: quiet by default, `-v` for
/// progress, `-vv` for per-record detail, `-vvv` for per-cell traces.
#[must_use]
pub fn verbosity_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the global logging subscriber.
///
/// Call once at startup. Subsequent calls return
/// `Err(LogError::AlreadyInitialized)`.
pub fn init_logging(verbosity: u8) -> Result<(), LogError> {
    if LOGGING_INITIALIZED.get().is_some() {
        return Err(LogError::AlreadyInitialized);
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity_filter(verbosity)));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let _ = LOGGING_INITIALIZED.set(true);
    Ok(())
}
