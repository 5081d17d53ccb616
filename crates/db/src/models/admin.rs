//! Admin accounts. Used only for admin-route authorization and login.

use complaints_core::roles::ROLE_ADMIN;
use complaints_core::types::{Barcode, Timestamp};
use sqlx::FromRow;

/// A row from the `admins` table.
///
/// Not `Serialize`; the password hash stays server-side.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: i64,
    pub barcode: Barcode,
    pub password_hash: String,
    pub role: String,
    pub created_at: Timestamp,
}

impl Admin {
    /// Whether this row carries the admin role tag.
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Insert payload for seeding an admin. `password_hash` is a PHC string.
#[derive(Debug, Clone)]
pub struct CreateAdmin {
    pub barcode: Barcode,
    pub password_hash: String,
    pub role: String,
}
