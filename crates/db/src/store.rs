//! Store ports consumed by the services, and their Postgres adapter.
//!
//! Services hold `Arc<dyn ...Store>` built once at startup, so tests can swap
//! in [`crate::memory::MemoryStore`] without a database.

use async_trait::async_trait;
use complaints_core::error::CoreError;
use complaints_core::types::{Barcode, DbId, Timestamp};

use crate::models::admin::{Admin, CreateAdmin};
use crate::models::category::{Category, CreateCategory, UpdateCategory};
use crate::models::complaint::{Complaint, ComplaintDetail, NewComplaint, UpdateComplaint};
use crate::repositories::{AdminRepo, CategoryRepo, ComplaintRepo};
use crate::DbPool;

/// PostgreSQL `foreign_key_violation`.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
/// PostgreSQL `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// Repository failure, tagged with the operation that produced it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{op}: foreign key violation ({constraint})")]
    ForeignKeyViolation {
        op: &'static str,
        constraint: String,
    },

    #[error("{op}: unique violation ({constraint})")]
    UniqueViolation {
        op: &'static str,
        constraint: String,
    },

    #[error("{op}: {source}")]
    Database {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    /// Classify a sqlx error raised by `op`.
    pub fn from_sqlx(op: &'static str, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            match db_err.code().as_deref() {
                Some(PG_FOREIGN_KEY_VIOLATION) => {
                    return Self::ForeignKeyViolation { op, constraint }
                }
                Some(PG_UNIQUE_VIOLATION) => return Self::UniqueViolation { op, constraint },
                _ => {}
            }
        }
        Self::Database { op, source: err }
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::ForeignKeyViolation { .. })
    }
}

/// Default mapping into the service taxonomy. Services override it where a
/// constraint means something more specific in context.
impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ForeignKeyViolation { constraint, .. } => {
                CoreError::Conflict(format!("Operation blocked by related rows ({constraint})"))
            }
            StoreError::UniqueViolation { constraint, .. } => {
                CoreError::Conflict(format!("Duplicate value violates unique constraint: {constraint}"))
            }
            err @ StoreError::Database { .. } => CoreError::Internal(err.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Category>, StoreError>;
    async fn find_by_id(&self, id: DbId) -> Result<Option<Category>, StoreError>;
    async fn create(&self, input: &CreateCategory) -> Result<Category, StoreError>;
    async fn update(
        &self,
        id: DbId,
        input: &UpdateCategory,
        now: Timestamp,
    ) -> Result<Option<Category>, StoreError>;
    /// `Ok(false)` if absent; `ForeignKeyViolation` if complaints reference it.
    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ComplaintStore: Send + Sync {
    async fn create(&self, input: &NewComplaint) -> Result<Complaint, StoreError>;
    async fn find_by_id(&self, id: DbId) -> Result<Option<ComplaintDetail>, StoreError>;
    async fn list(&self) -> Result<Vec<ComplaintDetail>, StoreError>;
    async fn list_by_barcode(&self, barcode: Barcode) -> Result<Vec<ComplaintDetail>, StoreError>;
    async fn list_by_category(&self, category_id: DbId)
        -> Result<Vec<ComplaintDetail>, StoreError>;
    async fn find_owner(&self, id: DbId) -> Result<Option<Barcode>, StoreError>;
    async fn last_created_at(&self, barcode: Barcode) -> Result<Option<Timestamp>, StoreError>;
    async fn update(
        &self,
        id: DbId,
        input: &UpdateComplaint,
        now: Timestamp,
    ) -> Result<Option<ComplaintDetail>, StoreError>;
    async fn delete(&self, id: DbId) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_by_barcode(&self, barcode: Barcode) -> Result<Option<Admin>, StoreError>;
    async fn create_if_absent(&self, input: &CreateAdmin) -> Result<bool, StoreError>;
}

/// Liveness probe for the backing store, used by `GET /health`.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres adapter
// ---------------------------------------------------------------------------

/// Implements every store port on top of the repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgStore {
    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        CategoryRepo::list(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx("categories.list", e))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Category>, StoreError> {
        CategoryRepo::find_by_id(&self.pool, id)
            .await
            .map_err(|e| StoreError::from_sqlx("categories.find_by_id", e))
    }

    async fn create(&self, input: &CreateCategory) -> Result<Category, StoreError> {
        CategoryRepo::create(&self.pool, input)
            .await
            .map_err(|e| StoreError::from_sqlx("categories.create", e))
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdateCategory,
        now: Timestamp,
    ) -> Result<Option<Category>, StoreError> {
        CategoryRepo::update(&self.pool, id, input, now)
            .await
            .map_err(|e| StoreError::from_sqlx("categories.update", e))
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        CategoryRepo::delete(&self.pool, id)
            .await
            .map_err(|e| StoreError::from_sqlx("categories.delete", e))
    }
}

#[async_trait]
impl ComplaintStore for PgStore {
    async fn create(&self, input: &NewComplaint) -> Result<Complaint, StoreError> {
        ComplaintRepo::create(&self.pool, input)
            .await
            .map_err(|e| StoreError::from_sqlx("complaints.create", e))
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<ComplaintDetail>, StoreError> {
        ComplaintRepo::find_by_id(&self.pool, id)
            .await
            .map_err(|e| StoreError::from_sqlx("complaints.find_by_id", e))
    }

    async fn list(&self) -> Result<Vec<ComplaintDetail>, StoreError> {
        ComplaintRepo::list(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx("complaints.list", e))
    }

    async fn list_by_barcode(&self, barcode: Barcode) -> Result<Vec<ComplaintDetail>, StoreError> {
        ComplaintRepo::list_by_barcode(&self.pool, barcode)
            .await
            .map_err(|e| StoreError::from_sqlx("complaints.list_by_barcode", e))
    }

    async fn list_by_category(
        &self,
        category_id: DbId,
    ) -> Result<Vec<ComplaintDetail>, StoreError> {
        ComplaintRepo::list_by_category(&self.pool, category_id)
            .await
            .map_err(|e| StoreError::from_sqlx("complaints.list_by_category", e))
    }

    async fn find_owner(&self, id: DbId) -> Result<Option<Barcode>, StoreError> {
        ComplaintRepo::find_owner(&self.pool, id)
            .await
            .map_err(|e| StoreError::from_sqlx("complaints.find_owner", e))
    }

    async fn last_created_at(&self, barcode: Barcode) -> Result<Option<Timestamp>, StoreError> {
        ComplaintRepo::last_created_at(&self.pool, barcode)
            .await
            .map_err(|e| StoreError::from_sqlx("complaints.last_created_at", e))
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdateComplaint,
        now: Timestamp,
    ) -> Result<Option<ComplaintDetail>, StoreError> {
        ComplaintRepo::update(&self.pool, id, input, now)
            .await
            .map_err(|e| StoreError::from_sqlx("complaints.update", e))
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        ComplaintRepo::delete(&self.pool, id)
            .await
            .map_err(|e| StoreError::from_sqlx("complaints.delete", e))
    }
}

#[async_trait]
impl AdminStore for PgStore {
    async fn find_by_barcode(&self, barcode: Barcode) -> Result<Option<Admin>, StoreError> {
        AdminRepo::find_by_barcode(&self.pool, barcode)
            .await
            .map_err(|e| StoreError::from_sqlx("admins.find_by_barcode", e))
    }

    async fn create_if_absent(&self, input: &CreateAdmin) -> Result<bool, StoreError> {
        AdminRepo::create_if_absent(&self.pool, input)
            .await
            .map_err(|e| StoreError::from_sqlx("admins.create_if_absent", e))
    }
}

#[async_trait]
impl HealthProbe for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx("health_check", e))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn row_not_found_is_a_plain_database_error() {
        let err = StoreError::from_sqlx("complaints.find_by_id", sqlx::Error::RowNotFound);
        assert_matches!(err, StoreError::Database { op: "complaints.find_by_id", .. });
        assert!(!err.is_foreign_key_violation());
    }

    #[test]
    fn database_errors_map_to_internal() {
        let err = StoreError::from_sqlx("categories.list", sqlx::Error::PoolTimedOut);
        let core: CoreError = err.into();
        assert_matches!(core, CoreError::Internal(msg) if msg.starts_with("categories.list"));
    }

    #[test]
    fn constraint_violations_map_to_conflict() {
        let fk = StoreError::ForeignKeyViolation {
            op: "categories.delete",
            constraint: "fk_complaints_category_id".into(),
        };
        assert_matches!(CoreError::from(fk), CoreError::Conflict(_));

        let uq = StoreError::UniqueViolation {
            op: "categories.create",
            constraint: "uq_categories_title".into(),
        };
        assert_matches!(CoreError::from(uq), CoreError::Conflict(msg) if msg.contains("uq_categories_title"));
    }
}
