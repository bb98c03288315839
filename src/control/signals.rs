//! Cooperative cancellation for long-running loops.
//!
//! Loops poll a [`CancelToken`] at iteration boundaries instead of being torn
//! down by a signal mid-trial. With the `signals` feature, SIGINT/SIGTERM are
//! routed into the token via `signal-hook`.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag.
///
/// `Ordering::Relaxed` is enough: the flag is polled once per iteration and
/// carries no data dependency with other memory.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// A token that is only cancelled programmatically.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that SIGINT/SIGTERM (Ctrl+C) will cancel.
    ///
    /// Registration is best-effort; failures are logged to stderr but not fatal.
    #[cfg(feature = "signals")]
    pub fn with_interrupts() -> Self {
        let token = Self::new();
        token.register_interrupts();
        token
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[cfg(feature = "signals")]
    fn register_interrupts(&self) {
        use signal_hook::consts::{SIGINT, SIGTERM};

        if let Err(e) = signal_hook::flag::register(SIGINT, Arc::clone(&self.flag)) {
            eprintln!("[PSIM-SIGNAL] failed to register SIGINT: {e}");
        }
        if let Err(e) = signal_hook::flag::register(SIGTERM, Arc::clone(&self.flag)) {
            eprintln!("[PSIM-SIGNAL] failed to register SIGTERM: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_cancelled() {
        assert!(!CancelToken::new().is_cancelled());
    }

    #[test]
    fn cancel_is_sticky() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(token.is_cancelled());
    }

    #[test]
    fn clones_share_state() {
        let token = CancelToken::new();
        let other = token.clone();
        other.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_from_another_thread() {
        let token = CancelToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel())
            .join()
            .unwrap();
        assert!(token.is_cancelled());
    }

    #[cfg(feature = "signals")]
    #[test]
    fn interrupt_token_starts_clear() {
        assert!(!CancelToken::with_interrupts().is_cancelled());
    }
}
