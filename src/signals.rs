// SPDX-License-Identifier: GPL-3.0-only

//! Termination signal handling
//!
//! Signal delivery only ever flips a [`CancellationToken`]. The capture loop
//! polls the token at the top of each iteration and does all logging itself.
//!
//! Handlers do not make a blocked frame wait resume: `poll` on the device
//! fails with `EINTR` whatever `SA_RESTART` says. The loop treats that
//! failure as a stop once the token is cancelled.

use crate::errors::SignalError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::debug;

/// Shared stop flag: one writer (signal delivery), one reader (the loop)
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop after the current frame
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Block for at most `timeout` until the token is cancelled
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_cancelled() {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        true
    }
}

/// Signals that end the capture loop
///
/// SIGKILL is listed for completeness but can never reach a handler; it is
/// skipped at install time.
pub const TERMINATION_SIGNALS: [libc::c_int; 6] = [
    libc::SIGINT,
    libc::SIGQUIT,
    libc::SIGKILL,
    libc::SIGTERM,
    libc::SIGABRT,
    libc::SIGTRAP,
];

/// Signals covered by the `ctrlc` handler thread
const CTRLC_SIGNALS: [libc::c_int; 2] = [libc::SIGINT, libc::SIGTERM];

/// Token written by the raw handler below
static SIGNAL_TOKEN: OnceLock<CancellationToken> = OnceLock::new();

extern "C" fn on_termination_signal(_signal: libc::c_int) {
    // Atomic loads and stores only
    if let Some(token) = SIGNAL_TOKEN.get() {
        token.cancel();
    }
}

/// Installed signal handlers feeding one cancellation token
pub struct SignalController {
    token: CancellationToken,
    registered: Vec<libc::c_int>,
}

impl SignalController {
    /// Route every catchable termination signal to `token`
    ///
    /// Can only succeed once per process.
    pub fn install(token: CancellationToken) -> Result<Self, SignalError> {
        let ctrlc_token = token.clone();
        ctrlc::set_handler(move || ctrlc_token.cancel())?;

        if SIGNAL_TOKEN.set(token.clone()).is_err() {
            return Err(SignalError::Ctrlc(ctrlc::Error::MultipleHandlers));
        }

        let mut registered = CTRLC_SIGNALS.to_vec();
        for signal in TERMINATION_SIGNALS {
            if signal == libc::SIGKILL {
                debug!(signal, "SIGKILL cannot be caught, not registering a handler");
                continue;
            }
            if CTRLC_SIGNALS.contains(&signal) {
                continue;
            }
            install_raw_handler(signal)?;
            registered.push(signal);
        }

        debug!(?registered, "Termination signal handlers installed");
        Ok(Self { token, registered })
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Signals that actually have a handler
    pub fn registered(&self) -> &[libc::c_int] {
        &self.registered
    }
}

fn install_raw_handler(signal: libc::c_int) -> Result<(), SignalError> {
    let result = unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_termination_signal as libc::sighandler_t;
        action.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut action.sa_mask);
        libc::sigaction(signal, &action, std::ptr::null_mut())
    };

    if result != 0 {
        return Err(SignalError::Sigaction {
            signal,
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}
