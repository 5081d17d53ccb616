//! Complaint categories and their canned answers.

use complaints_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `categories` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub answer: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub answer: String,
}

/// DTO for partially updating a category. Absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub title: Option<String>,
    pub description: Option<String>,
    pub answer: Option<String>,
}
