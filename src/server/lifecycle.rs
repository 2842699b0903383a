//! Process lifecycle: serve until interrupted, then shut down within a bound
//!
//! States move strictly forward: `Running -> ShuttingDown -> Terminated`.
//!
//! On interrupt:
//! 1. The listener stops accepting new connections
//! 2. Registered resources are released, racing a fixed bound
//! 3. Whichever finishes first decides the outcome; if the bound wins the
//!    cleanup is cancelled rather than left running
//!
//! Both outcomes are a clean exit. Only a failed bind is an error.

use axum::Router;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use super::cleanup::Resources;
use super::shutdown::{shutdown_channel, InterruptWatcher};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to install interrupt handler: {0}")]
    Signal(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Running,
    ShuttingDown,
    Terminated,
}

/// How the shutdown race ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    FinishedOnTime,
    TimedOut,
}

/// Owns the bound listener, the app, and what must be released on exit
pub struct Lifecycle {
    listener: TcpListener,
    addr: SocketAddr,
    app: Router,
    resources: Resources,
    shutdown_timeout: Duration,
    state: watch::Sender<LifecycleState>,
}

impl Lifecycle {
    /// Bind the listening socket. Failure here is fatal to the process.
    pub async fn bind(
        addr: &str,
        app: Router,
        resources: Resources,
        shutdown_timeout: Duration,
    ) -> Result<Self, ServerError> {
        let bind_err = |source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        };
        let listener = TcpListener::bind(addr).await.map_err(bind_err)?;
        let local = listener.local_addr().map_err(bind_err)?;
        let (state, _) = watch::channel(LifecycleState::Running);

        Ok(Self {
            listener,
            addr: local,
            app,
            resources,
            shutdown_timeout,
            state,
        })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Observe state transitions. Starts in `Running` once bound.
    pub fn state(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Serve until the process receives an interrupt, then shut down
    pub async fn run(self) -> Result<ShutdownOutcome, ServerError> {
        let watcher = InterruptWatcher::arm().map_err(|e| {
            error!(error = %e, "Failed to install interrupt handler");
            ServerError::Signal(e)
        })?;
        Ok(self.run_until(watcher.recv()).await)
    }

    /// Serve until `trigger` resolves with a signal name, then shut down
    ///
    /// `trigger` is awaited once; the shutdown sequence cannot be cancelled
    /// after it fires.
    pub async fn run_until<F>(self, trigger: F) -> ShutdownOutcome
    where
        F: Future<Output = &'static str>,
    {
        let Self {
            listener,
            addr,
            app,
            resources,
            shutdown_timeout,
            state,
        } = self;

        let (stop_accepting, mut accept_signal) = shutdown_channel();
        let server = tokio::spawn(async move {
            let serve = axum::serve(listener, app)
                .with_graceful_shutdown(async move { accept_signal.wait().await });
            if let Err(e) = serve.await {
                error!(error = %e, "HTTP server failed");
            }
        });

        info!("serving app at: {}", addr);

        let signal = trigger.await;
        info!("received sig: {}", signal);
        state.send_replace(LifecycleState::ShuttingDown);

        stop_accepting.shutdown();
        let outcome = close_resources(resources, shutdown_timeout).await;

        // Connections still open after the race are not waited for
        server.abort();
        let _ = server.await;

        state.send_replace(LifecycleState::Terminated);
        outcome
    }
}

/// Race resource cleanup against `bound`
///
/// The first to finish wins. A losing cleanup is cancelled through its
/// shutdown signal; it is not awaited.
///
/// A cleanup that panics still ends the race before the bound, so it counts
/// as `FinishedOnTime`, but it is logged as a failure.
pub async fn close_resources(resources: Resources, bound: Duration) -> ShutdownOutcome {
    if resources.is_empty() {
        info!("closing resources has finished on time");
        return ShutdownOutcome::FinishedOnTime;
    }

    info!(resources = resources.len(), bound = ?bound, "releasing resources");
    let (cancel, signal) = shutdown_channel();
    let mut cleanup = tokio::spawn(resources.release_all(signal));

    tokio::select! {
        _ = tokio::time::sleep(bound) => {
            info!(bound = ?bound, "closing resources has timed out");
            cancel.shutdown();
            ShutdownOutcome::TimedOut
        }
        joined = &mut cleanup => {
            match joined {
                Ok(()) => info!("closing resources has finished on time"),
                Err(e) => error!(error = %e, "closing resources panicked"),
            }
            ShutdownOutcome::FinishedOnTime
        }
    }
}
