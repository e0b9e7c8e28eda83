//! SIGINT/SIGTERM handling.
//!
//! The handler only raises a flag. The workflow polls it between domains so the
//! tunnel session is still released through its normal scope exit.

use std::sync::atomic::{AtomicBool, Ordering};

static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_signal(_signum: libc::c_int) {
    // Only async-signal-safe work here.
    STOP_REQUESTED.store(true, Ordering::SeqCst);
}

/// Installs the stop handler for SIGINT and SIGTERM.
///
/// Returns `false` if either handler could not be installed; the caller should
/// warn that an interrupt will then kill the process without tunnel teardown.
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn install() -> bool {
    let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
    [libc::SIGINT, libc::SIGTERM].iter().all(|&sig| {
        // SAFETY: the handler only performs an atomic store, which is
        // async-signal-safe, and has the signature `signal` expects.
        unsafe { libc::signal(sig, handler) != libc::SIG_ERR }
    })
}

#[cfg(not(unix))]
pub fn install() -> bool {
    false
}

/// Flag raised by the signal handler, shared with the workflow.
pub fn stop_flag() -> &'static AtomicBool {
    &STOP_REQUESTED
}
