//! Resource cleanup run during shutdown
//!
//! Anything that must be released before exit (connections, files, buffers)
//! implements `Resource` and is registered in `Resources`. Release is told to
//! stop through a `ShutdownSignal` when the shutdown bound elapses first.

use async_trait::async_trait;
use futures::future::join_all;
use std::time::Duration;
use tracing::{info, warn};

use super::shutdown::ShutdownSignal;

#[async_trait]
pub trait Resource: Send + Sync {
    fn name(&self) -> &str;

    /// Release the resource. Should return promptly once `cancel` fires.
    async fn release(&self, cancel: ShutdownSignal);
}

/// Registered resources, released together on shutdown
#[derive(Default)]
pub struct Resources {
    items: Vec<Box<dyn Resource>>,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resource: impl Resource + 'static) -> Self {
        self.items.push(Box::new(resource));
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Release every resource concurrently; completes when all have returned
    pub async fn release_all(self, cancel: ShutdownSignal) {
        join_all(
            self.items
                .iter()
                .map(|resource| resource.release(cancel.clone())),
        )
        .await;
    }
}

/// Stand-in for real teardown: takes a fixed time to release
pub struct SimulatedResource {
    name: String,
    delay: Duration,
}

impl SimulatedResource {
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
        }
    }
}

#[async_trait]
impl Resource for SimulatedResource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn release(&self, mut cancel: ShutdownSignal) {
        if cancel.is_shutdown() {
            warn!(resource = %self.name, "closing resources cancelled before start");
            return;
        }
        info!(resource = %self.name, "closing resources ....");
        tokio::select! {
            _ = tokio::time::sleep(self.delay) => {
                info!(resource = %self.name, "done closing resources ....");
            }
            _ = cancel.wait() => {
                warn!(resource = %self.name, "closing resources cancelled");
            }
        }
    }
}
