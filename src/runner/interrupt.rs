//! Cooperative cancellation.
//!
//! The runner checks an [`InterruptFlag`] before starting each step. A
//! step already applying is left to finish or to die with the signal.
//! Timed commands run in their own process group, so the shell layer
//! kills them itself once SIGINT arrives. Idempotent probes make the next
//! run pick up where this one stopped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_sigint(_signal: libc::c_int) {
    SIGINT_RECEIVED.store(true, Ordering::SeqCst);
}

/// Install a SIGINT handler that trips every [`InterruptFlag::sigint`] flag.
pub fn install_sigint_handler() {
    #[cfg(unix)]
    {
        let handler = on_sigint as extern "C" fn(libc::c_int);
        // SAFETY: the handler only performs an atomic store, which is async-signal-safe
        unsafe {
            libc::signal(libc::SIGINT, handler as libc::sighandler_t);
        }
    }
}

/// Whether SIGINT arrived since the handler was installed.
pub(crate) fn sigint_received() -> bool {
    SIGINT_RECEIVED.load(Ordering::SeqCst)
}

/// A cancellation flag shared between the runner and whoever cancels it.
#[derive(Debug, Clone)]
pub struct InterruptFlag {
    local: Arc<AtomicBool>,
    follow_signal: bool,
}

impl Default for InterruptFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptFlag {
    /// A flag only tripped by [`trigger`](Self::trigger).
    pub fn new() -> Self {
        Self {
            local: Arc::new(AtomicBool::new(false)),
            follow_signal: false,
        }
    }

    /// A flag that is also tripped by SIGINT once the handler is installed.
    pub fn sigint() -> Self {
        Self {
            local: Arc::new(AtomicBool::new(false)),
            follow_signal: true,
        }
    }

    /// Request cancellation.
    pub fn trigger(&self) {
        self.local.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_set(&self) -> bool {
        self.local.load(Ordering::SeqCst)
            || (self.follow_signal && sigint_received())
    }
}
