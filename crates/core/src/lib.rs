//! Domain rules for the complaint intake service.
//!
//! This crate has no I/O. It holds the error taxonomy shared by every layer,
//! the input validation rules for complaints and categories, the submission
//! rate-gate decision, and the cache key scheme.

pub mod cache_keys;
pub mod category;
pub mod complaint;
pub mod error;
pub mod rate_gate;
pub mod roles;
pub mod types;
