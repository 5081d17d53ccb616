//! Complaints, as stored and as read back joined with their category.

use complaints_core::complaint::ComplaintStatus;
use complaints_core::types::{Barcode, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `complaints` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Complaint {
    pub id: DbId,
    pub barcode: Barcode,
    pub category_id: DbId,
    pub message: String,
    pub status: ComplaintStatus,
    pub answer: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A complaint joined with its category (`complaints JOIN categories`).
///
/// This is the shape every read endpoint returns and the shape cached under
/// the complaint list key.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ComplaintDetail {
    pub id: DbId,
    pub barcode: Barcode,
    pub message: String,
    pub status: ComplaintStatus,
    pub answer: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub category_id: DbId,
    pub category_title: String,
    pub category_description: String,
    pub category_answer: String,
}

/// Insert payload. `created_at` comes from the service clock so the rate
/// gate and the stored row agree on time.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub barcode: Barcode,
    pub category_id: DbId,
    pub message: String,
    pub created_at: Timestamp,
}

/// DTO for an admin content update. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateComplaint {
    pub category_id: Option<DbId>,
    pub message: Option<String>,
    pub status: Option<ComplaintStatus>,
    pub answer: Option<String>,
}
