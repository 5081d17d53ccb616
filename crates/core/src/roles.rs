//! Well-known role name constants.
//!
//! These must match the `role` values written to the `admins` table.

pub const ROLE_ADMIN: &str = "admin";
