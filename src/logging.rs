//! Diagnostic logging setup.
//!
//! User-facing messages (errors, the truncation notice) are written to stderr
//! directly. Everything else goes through `tracing` and is silent unless
//! `-v` or `RUST_LOG` asks for it.

use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
