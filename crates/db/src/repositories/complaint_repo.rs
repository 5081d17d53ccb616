//! Repository for the `complaints` table.
//!
//! Reads are joined with `categories` and return [`ComplaintDetail`].

use complaints_core::types::{Barcode, DbId, Timestamp};
use sqlx::PgPool;

use crate::models::complaint::{Complaint, ComplaintDetail, NewComplaint, UpdateComplaint};

/// Column list for plain `complaints` rows.
const COLUMNS: &str = "\
    id, barcode, category_id, message, status, answer, created_at, updated_at";

/// Select list for joined reads. Expects `c` = complaints, `cat` = categories.
const DETAIL_COLUMNS: &str = "\
    c.id, c.barcode, c.message, c.status, c.answer, c.created_at, c.updated_at, \
    cat.id AS category_id, cat.title AS category_title, \
    cat.description AS category_description, cat.answer AS category_answer";

/// Provides data access for complaints.
pub struct ComplaintRepo;

impl ComplaintRepo {
    /// Insert a new complaint in `pending` status.
    pub async fn create(pool: &PgPool, input: &NewComplaint) -> Result<Complaint, sqlx::Error> {
        let query = format!(
            "INSERT INTO complaints (barcode, category_id, message, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Complaint>(&query)
            .bind(input.barcode)
            .bind(input.category_id)
            .bind(&input.message)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// Find one complaint, joined with its category.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ComplaintDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM complaints c \
             JOIN categories cat ON cat.id = c.category_id \
             WHERE c.id = $1"
        );
        sqlx::query_as::<_, ComplaintDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every complaint, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<ComplaintDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM complaints c \
             JOIN categories cat ON cat.id = c.category_id \
             ORDER BY c.created_at DESC"
        );
        sqlx::query_as::<_, ComplaintDetail>(&query)
            .fetch_all(pool)
            .await
    }

    /// List the complaints submitted by `barcode`, newest first.
    pub async fn list_by_barcode(
        pool: &PgPool,
        barcode: Barcode,
    ) -> Result<Vec<ComplaintDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM complaints c \
             JOIN categories cat ON cat.id = c.category_id \
             WHERE c.barcode = $1 \
             ORDER BY c.created_at DESC"
        );
        sqlx::query_as::<_, ComplaintDetail>(&query)
            .bind(barcode)
            .fetch_all(pool)
            .await
    }

    /// List the complaints filed under `category_id`, newest first.
    pub async fn list_by_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<ComplaintDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM complaints c \
             JOIN categories cat ON cat.id = c.category_id \
             WHERE c.category_id = $1 \
             ORDER BY c.created_at DESC"
        );
        sqlx::query_as::<_, ComplaintDetail>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// The owner barcode of a complaint, or `None` if it does not exist.
    pub async fn find_owner(pool: &PgPool, id: DbId) -> Result<Option<Barcode>, sqlx::Error> {
        sqlx::query_scalar::<_, Barcode>("SELECT barcode FROM complaints WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// `created_at` of the owner's most recent complaint.
    pub async fn last_created_at(
        pool: &PgPool,
        barcode: Barcode,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Timestamp>(
            "SELECT created_at FROM complaints \
             WHERE barcode = $1 \
             ORDER BY created_at DESC \
             LIMIT 1",
        )
        .bind(barcode)
        .fetch_optional(pool)
        .await
    }

    /// Partially update a complaint and return it joined with its (possibly
    /// new) category. Returns `None` if no row with `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateComplaint,
        now: Timestamp,
    ) -> Result<Option<ComplaintDetail>, sqlx::Error> {
        let query = format!(
            "WITH c AS ( \
                 UPDATE complaints SET \
                     category_id = COALESCE($2, category_id), \
                     message = COALESCE($3, message), \
                     status = COALESCE($4, status), \
                     answer = COALESCE($5, answer), \
                     updated_at = $6 \
                 WHERE id = $1 \
                 RETURNING {COLUMNS} \
             ) \
             SELECT {DETAIL_COLUMNS} FROM c \
             JOIN categories cat ON cat.id = c.category_id"
        );
        sqlx::query_as::<_, ComplaintDetail>(&query)
            .bind(id)
            .bind(input.category_id)
            .bind(&input.message)
            .bind(input.status)
            .bind(&input.answer)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Delete a complaint by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM complaints WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
