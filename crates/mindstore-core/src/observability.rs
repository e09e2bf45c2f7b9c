//! Tracing initialization. Call once at process startup.
//!
//! MINDSTORE_QUIET=1 limits output to WARN and above; MINDSTORE_LOG_LEVEL
//! sets the default filter otherwise. RUST_LOG always wins when set.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Safe to call more than once;
/// later calls are no-ops.
pub fn init_tracing() {
    let quiet = std::env::var("MINDSTORE_QUIET")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let default_level = if quiet {
        "warn".to_string()
    } else {
        std::env::var("MINDSTORE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
