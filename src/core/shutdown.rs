//! # Shutdown coordination.
//!
//! - [`wait_for_shutdown_signal`] completes when the process receives a termination signal.
//! - [`ShutdownHandle`] is a cloneable trigger plus the observable [`ShutdownPhase`].
//! - [`Drain`] tracks which components still have to report closed.
//!
//! ## Phases
//! ```text
//! Running ──trigger()──► Draining ──(session closed && listener closed) or grace elapsed──► Terminated
//! ```
//!
//! ## Rules
//! - `trigger()` is idempotent: only the first call moves the agent out of `Running`.
//! - Teardown runs once; a trigger while `Draining` changes nothing.
//!
//! ## Signals
//! **Unix platforms:** `SIGINT`, `SIGTERM`, `SIGQUIT`.
//!
//! **Other platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio_util::sync::CancellationToken;

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Lifecycle phase of the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ShutdownPhase {
    /// Handling messages and heartbeats.
    Running = 0,
    /// Session and listener asked to close; inbound messages are ignored.
    Draining = 1,
    /// Everything closed or the safety timeout elapsed.
    Terminated = 2,
}

impl ShutdownPhase {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => ShutdownPhase::Running,
            1 => ShutdownPhase::Draining,
            _ => ShutdownPhase::Terminated,
        }
    }
}

/// Cloneable shutdown trigger and phase observer.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    token: CancellationToken,
    phase: Arc<AtomicU8>,
}

impl ShutdownHandle {
    pub(crate) fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            phase: Arc::new(AtomicU8::new(ShutdownPhase::Running as u8)),
        }
    }

    /// Requests shutdown. Later calls are no-ops.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    /// True once [`trigger`](Self::trigger) was called.
    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Current phase.
    pub fn phase(&self) -> ShutdownPhase {
        ShutdownPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub(crate) async fn triggered(&self) {
        self.token.cancelled().await
    }

    /// Moves forward to `next`; never moves backwards.
    pub(crate) fn advance(&self, next: ShutdownPhase) {
        self.phase.fetch_max(next as u8, Ordering::AcqRel);
    }
}

/// Components the coordinator waits for while draining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Drain {
    pub(crate) session_open: bool,
    pub(crate) listener_open: bool,
}

impl Drain {
    pub(crate) fn new(listener: bool) -> Self {
        Self {
            session_open: true,
            listener_open: listener,
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        !self.session_open && !self.listener_open
    }

    /// Comma-separated names of components still open.
    pub(crate) fn open_components(&self) -> String {
        let mut open = Vec::new();
        if self.session_open {
            open.push("session");
        }
        if self.listener_open {
            open.push("listener");
        }
        open.join(",")
    }
}
