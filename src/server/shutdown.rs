//! Shutdown signalling
//!
//! - `InterruptWatcher` turns the process interrupt signal into a single-shot event
//! - `shutdown_channel` gives a trigger/listener pair used both to stop the
//!   listener and to cancel resource cleanup that outlives its bound

use tokio::sync::watch;
use tracing::info;

/// Listener half of a shutdown pair
///
/// Cheap to clone; every clone observes the same trigger.
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Wait for shutdown signal
    pub async fn wait(&mut self) {
        while !self.is_shutdown() {
            if self.receiver.changed().await.is_err() {
                // Sender dropped, treat as shutdown
                break;
            }
        }
    }

    /// Check if shutdown was signaled (non-blocking)
    pub fn is_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }
}

/// Trigger half of a shutdown pair
pub struct ShutdownController {
    sender: watch::Sender<bool>,
}

impl ShutdownController {
    /// Trigger shutdown. Idempotent.
    pub fn shutdown(&self) {
        if self.sender.send_replace(true) {
            return;
        }
        info!(listeners = self.sender.receiver_count(), "Shutdown signal sent");
    }
}

/// Create a new shutdown signal pair
///
/// Returns (controller, signal) where:
/// - controller: Used to trigger shutdown
/// - signal: Cloned and passed to components that need to listen
pub fn shutdown_channel() -> (ShutdownController, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (ShutdownController { sender }, ShutdownSignal { receiver })
}

/// Armed subscription to the process interrupt signal (SIGINT / Ctrl+C)
///
/// Arming installs the handler, so an interrupt arriving before `recv` is
/// polled is not lost. `recv` consumes the watcher: it fires at most once
/// and is never re-armed, later interrupts are ignored.
pub struct InterruptWatcher {
    #[cfg(unix)]
    signal: tokio::signal::unix::Signal,
}

impl InterruptWatcher {
    #[cfg(unix)]
    pub fn arm() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            signal: signal(SignalKind::interrupt())?,
        })
    }

    #[cfg(not(unix))]
    pub fn arm() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the interrupt. Returns the signal name that was received.
    #[cfg(unix)]
    pub async fn recv(mut self) -> &'static str {
        self.signal.recv().await;
        "SIGINT"
    }

    /// Wait for Ctrl+C (Windows)
    #[cfg(not(unix))]
    pub async fn recv(self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to wait for Ctrl+C");
            // Without a handler there is nothing to wait for
            std::future::pending::<()>().await;
        }
        "CTRL_C"
    }
}
