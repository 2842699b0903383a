//! Service configuration
//!
//! Every value is fixed at build time. Tests construct their own `Config`
//! to point at fake upstreams or shorten the shutdown bounds.

use std::time::Duration;

/// Default listening port
pub const DEFAULT_PORT: u16 = 7000;

/// Upstream endpoint serving the user list
pub const DEFAULT_UPSTREAM_URL: &str = "https://jsonplaceholder.typicode.com/users";

/// Client-side timeout for the upstream call
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(3);

/// Upper bound on the shutdown sequence
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Release delay of the simulated resource
pub const DEFAULT_CLEANUP_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub upstream_url: String,
    pub upstream_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub cleanup_delay: Duration,
}

impl Config {
    /// `host:port` string the listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            cleanup_delay: DEFAULT_CLEANUP_DELAY,
        }
    }
}
