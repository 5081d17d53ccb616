//! Use-case services between the HTTP layer and the stores.
//!
//! Each service holds its store ports as trait objects, plus the shared
//! [`CacheAside`](complaints_cache::CacheAside) and clock, all injected by
//! [`AppState::new`](crate::state::AppState::new).

pub mod admin;
pub mod category;
pub mod complaint;
pub mod rate_gate;
