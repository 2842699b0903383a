//! Client for the upstream user service
//!
//! The upstream is an opaque HTTP API returning a JSON array of user records.
//! Handlers depend on the `UserSource` trait, never on reqwest directly.

mod client;

pub use client::{decode_users, HttpUserSource, UpstreamError, User, UserSource};

#[cfg(test)]
#[path = "client_test.rs"]
mod client_tests;
