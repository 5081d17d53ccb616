//! Complaint intake API server library.
//!
//! Exposes config, state, error handling, guards, services, and routes so
//! integration tests and the binary entrypoint build the same application.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
