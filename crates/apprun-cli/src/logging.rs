//! Diagnostic output setup shared by both binaries.

use tracing_subscriber::EnvFilter;

/// Variable holding the log filter, e.g. `APPRUN_LOG=debug`.
pub const LOG_VAR: &str = "APPRUN_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber. Output goes to stderr so that the
/// launched tool's stdout is never mixed with diagnostics.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // A subscriber installed earlier (tests) stays in place.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
