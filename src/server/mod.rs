//! HTTP server and process lifecycle
//!
//! Serves:
//! - `/` - Health check
//! - `/users` - User list proxied from the upstream service
//!
//! Also owns graceful shutdown on SIGINT, bounded in time.

pub mod cleanup;
pub mod lifecycle;
mod middleware;
mod routes;
pub mod shutdown;

pub use cleanup::{Resource, Resources, SimulatedResource};
pub use lifecycle::{close_resources, Lifecycle, LifecycleState, ServerError, ShutdownOutcome};
pub use routes::{build_router, ErrorPayload, HealthStatus};
pub use shutdown::{shutdown_channel, InterruptWatcher, ShutdownController, ShutdownSignal};

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_tests;

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;
