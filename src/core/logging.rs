/*!
 * Logging Initialization
 * Structured tracing and env_logger setup for embedders and tests
 */

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize structured tracing from `RUST_LOG`
///
/// Idempotent: a second call is a no-op rather than a panic, so tests and
/// embedders can both call it.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// Initialize the `log` facade for binaries/tests that prefer env_logger
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env().try_init();
}
