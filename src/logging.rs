//! Diagnostic logging setup
//!
//! `TFREPORT_LOG` takes a standard filter directive (e.g. `tfreport=debug`).
//! Without it only warnings are shown, or debug output with `--verbose`.
//! Logs go to stderr so stdout stays clean for JSON output.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "TFREPORT_LOG";

pub fn initialize(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed (e.g. in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
