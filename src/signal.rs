//! Signal handling infrastructure for graceful shutdown.
//!
//! This module provides flag-based signal handling using `signal-hook::flag`.
//! It supports:
//! - Graceful shutdown on SIGINT/SIGTERM (sets flag, follow loops stop between passes)
//! - Force quit on double Ctrl+C (immediate exit with code 1)

use signal_hook::consts::TERM_SIGNALS;
use signal_hook::flag;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Longest uninterrupted sleep while waiting for the next follow cycle.
const SHUTDOWN_POLL_SLICE: Duration = Duration::from_millis(100);

/// Set up signal handlers for graceful shutdown.
///
/// Returns an `Arc<AtomicBool>` that becomes `true` when a termination signal
/// (SIGINT, SIGTERM) is received. A tailer pass is never interrupted; the
/// follow loops check the flag between passes and while sleeping.
///
/// On receiving a second signal while the flag is already true, the process
/// exits immediately with code 1 (force quit behavior).
pub fn setup_shutdown_handlers() -> Result<Arc<AtomicBool>, std::io::Error> {
    let term_now = Arc::new(AtomicBool::new(false));

    for sig in TERM_SIGNALS {
        // First: register conditional shutdown (exits with code 1 on second signal)
        // This only triggers if term_now is already true
        flag::register_conditional_shutdown(*sig, 1, Arc::clone(&term_now))?;

        // Second: set term_now to true, arming the conditional shutdown for next signal
        flag::register(*sig, Arc::clone(&term_now))?;
    }

    Ok(term_now)
}

/// Whether shutdown was requested. No flag means "never".
pub fn is_shutdown(flag: Option<&AtomicBool>) -> bool {
    flag.is_some_and(|f| f.load(Ordering::SeqCst))
}

/// Sleep for `duration`, waking early if shutdown is requested.
///
/// Returns `false` when shutdown was requested before or during the sleep.
pub fn sleep_unless_shutdown(duration: Duration, flag: Option<&AtomicBool>) -> bool {
    let deadline = Instant::now() + duration;

    loop {
        if is_shutdown(flag) {
            return false;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return true;
        }
        thread::sleep(remaining.min(SHUTDOWN_POLL_SLICE));
    }
}
