//! Authentication and authorization extractors.
//!
//! They run before the handler body, so a rejected request never reaches a
//! service call.
//!
//! - [`auth::AuthUser`] -- verified bearer token.
//! - [`auth::OptionalAuthUser`] -- verified bearer token, or anonymous if no
//!   `Authorization` header was sent.
//! - [`rbac::RequireAdmin`] -- token subject must be a registered admin.
//! - [`owner::RequireOwner`] -- token subject must own the `{id}` resource.

pub mod auth;
pub mod owner;
pub mod rbac;
