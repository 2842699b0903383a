//! userproxy: a small JSON HTTP service with a health check, a proxied
//! user listing, and a time-bounded graceful shutdown.

pub mod config;
pub mod server;
pub mod upstream;

#[cfg(test)]
mod testing;
