//! Repository for the `admins` table.

use complaints_core::types::Barcode;
use sqlx::PgPool;

use crate::models::admin::{Admin, CreateAdmin};

/// Column list for `admins` queries.
const COLUMNS: &str = "id, barcode, password_hash, role, created_at";

/// Provides lookup and seeding for admin accounts.
pub struct AdminRepo;

impl AdminRepo {
    /// Find an admin by barcode.
    pub async fn find_by_barcode(
        pool: &PgPool,
        barcode: Barcode,
    ) -> Result<Option<Admin>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM admins WHERE barcode = $1");
        sqlx::query_as::<_, Admin>(&query)
            .bind(barcode)
            .fetch_optional(pool)
            .await
    }

    /// Insert an admin unless one with the same barcode already exists.
    ///
    /// Returns `true` if a row was inserted.
    pub async fn create_if_absent(pool: &PgPool, input: &CreateAdmin) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO admins (barcode, password_hash, role) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (barcode) DO NOTHING",
        )
        .bind(input.barcode)
        .bind(&input.password_hash)
        .bind(&input.role)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
