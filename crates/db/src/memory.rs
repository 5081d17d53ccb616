//! In-process implementation of the store ports.
//!
//! Enforces the same constraints as the schema in `db/migrations`: unique
//! category titles, complaint → category foreign key with `ON DELETE
//! RESTRICT`, and insert-if-absent admins. Used by the HTTP and service tests
//! and for running the API without Postgres.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use complaints_core::complaint::ComplaintStatus;
use complaints_core::types::{Barcode, DbId, Timestamp};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::admin::{Admin, CreateAdmin};
use crate::models::category::{Category, CreateCategory, UpdateCategory};
use crate::models::complaint::{Complaint, ComplaintDetail, NewComplaint, UpdateComplaint};
use crate::store::{AdminStore, CategoryStore, ComplaintStore, HealthProbe, StoreError};

const FK_COMPLAINT_CATEGORY: &str = "fk_complaints_category_id";
const UQ_CATEGORY_TITLE: &str = "uq_categories_title";

#[derive(Default)]
struct Tables {
    categories: HashMap<DbId, Category>,
    complaints: HashMap<DbId, Complaint>,
    admins: HashMap<Barcode, Admin>,
}

impl Tables {
    fn detail(&self, complaint: &Complaint) -> Option<ComplaintDetail> {
        let category = self.categories.get(&complaint.category_id)?;
        Some(ComplaintDetail {
            id: complaint.id,
            barcode: complaint.barcode,
            message: complaint.message.clone(),
            status: complaint.status,
            answer: complaint.answer.clone(),
            created_at: complaint.created_at,
            updated_at: complaint.updated_at,
            category_id: category.id,
            category_title: category.title.clone(),
            category_description: category.description.clone(),
            category_answer: category.answer.clone(),
        })
    }

    /// Joined rows matching `filter`, newest first.
    fn details_where(&self, filter: impl Fn(&Complaint) -> bool) -> Vec<ComplaintDetail> {
        let mut rows: Vec<ComplaintDetail> = self
            .complaints
            .values()
            .filter(|c| filter(c))
            .filter_map(|c| self.detail(c))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }

    fn title_taken(&self, title: &str, except: Option<DbId>) -> bool {
        self.categories
            .values()
            .any(|c| c.title == title && Some(c.id) != except)
    }
}

/// Thread-safe in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    next_admin_id: AtomicI64,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self, op: &'static str) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database {
                op,
                source: sqlx::Error::PoolTimedOut,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Category>, StoreError> {
        self.check_available("categories.list")?;
        let tables = self.tables.read().await;
        let mut rows: Vec<Category> = tables.categories.values().cloned().collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rows)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Category>, StoreError> {
        self.check_available("categories.find_by_id")?;
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn create(&self, input: &CreateCategory) -> Result<Category, StoreError> {
        self.check_available("categories.create")?;
        let mut tables = self.tables.write().await;
        if tables.title_taken(&input.title, None) {
            return Err(StoreError::UniqueViolation {
                op: "categories.create",
                constraint: UQ_CATEGORY_TITLE.into(),
            });
        }
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            title: input.title.clone(),
            description: input.description.clone(),
            answer: input.answer.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdateCategory,
        now: Timestamp,
    ) -> Result<Option<Category>, StoreError> {
        self.check_available("categories.update")?;
        let mut tables = self.tables.write().await;
        if let Some(title) = &input.title {
            if tables.title_taken(title, Some(id)) {
                return Err(StoreError::UniqueViolation {
                    op: "categories.update",
                    constraint: UQ_CATEGORY_TITLE.into(),
                });
            }
        }
        let Some(category) = tables.categories.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &input.title {
            category.title = title.clone();
        }
        if let Some(description) = &input.description {
            category.description = description.clone();
        }
        if let Some(answer) = &input.answer {
            category.answer = answer.clone();
        }
        category.updated_at = now;
        Ok(Some(category.clone()))
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        self.check_available("categories.delete")?;
        let mut tables = self.tables.write().await;
        if tables.complaints.values().any(|c| c.category_id == id) {
            return Err(StoreError::ForeignKeyViolation {
                op: "categories.delete",
                constraint: FK_COMPLAINT_CATEGORY.into(),
            });
        }
        Ok(tables.categories.remove(&id).is_some())
    }
}

#[async_trait]
impl ComplaintStore for MemoryStore {
    async fn create(&self, input: &NewComplaint) -> Result<Complaint, StoreError> {
        self.check_available("complaints.create")?;
        let mut tables = self.tables.write().await;
        if !tables.categories.contains_key(&input.category_id) {
            return Err(StoreError::ForeignKeyViolation {
                op: "complaints.create",
                constraint: FK_COMPLAINT_CATEGORY.into(),
            });
        }
        let complaint = Complaint {
            id: Uuid::new_v4(),
            barcode: input.barcode,
            category_id: input.category_id,
            message: input.message.clone(),
            status: ComplaintStatus::Pending,
            answer: None,
            created_at: input.created_at,
            updated_at: input.created_at,
        };
        tables.complaints.insert(complaint.id, complaint.clone());
        Ok(complaint)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<ComplaintDetail>, StoreError> {
        self.check_available("complaints.find_by_id")?;
        let tables = self.tables.read().await;
        Ok(tables.complaints.get(&id).and_then(|c| tables.detail(c)))
    }

    async fn list(&self) -> Result<Vec<ComplaintDetail>, StoreError> {
        self.check_available("complaints.list")?;
        Ok(self.tables.read().await.details_where(|_| true))
    }

    async fn list_by_barcode(&self, barcode: Barcode) -> Result<Vec<ComplaintDetail>, StoreError> {
        self.check_available("complaints.list_by_barcode")?;
        Ok(self
            .tables
            .read()
            .await
            .details_where(|c| c.barcode == barcode))
    }

    async fn list_by_category(
        &self,
        category_id: DbId,
    ) -> Result<Vec<ComplaintDetail>, StoreError> {
        self.check_available("complaints.list_by_category")?;
        Ok(self
            .tables
            .read()
            .await
            .details_where(|c| c.category_id == category_id))
    }

    async fn find_owner(&self, id: DbId) -> Result<Option<Barcode>, StoreError> {
        self.check_available("complaints.find_owner")?;
        Ok(self.tables.read().await.complaints.get(&id).map(|c| c.barcode))
    }

    async fn last_created_at(&self, barcode: Barcode) -> Result<Option<Timestamp>, StoreError> {
        self.check_available("complaints.last_created_at")?;
        Ok(self
            .tables
            .read()
            .await
            .complaints
            .values()
            .filter(|c| c.barcode == barcode)
            .map(|c| c.created_at)
            .max())
    }

    async fn update(
        &self,
        id: DbId,
        input: &UpdateComplaint,
        now: Timestamp,
    ) -> Result<Option<ComplaintDetail>, StoreError> {
        self.check_available("complaints.update")?;
        let mut tables = self.tables.write().await;
        if !tables.complaints.contains_key(&id) {
            return Ok(None);
        }
        if let Some(category_id) = input.category_id {
            if !tables.categories.contains_key(&category_id) {
                return Err(StoreError::ForeignKeyViolation {
                    op: "complaints.update",
                    constraint: FK_COMPLAINT_CATEGORY.into(),
                });
            }
        }
        let Some(complaint) = tables.complaints.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(category_id) = input.category_id {
            complaint.category_id = category_id;
        }
        if let Some(message) = &input.message {
            complaint.message = message.clone();
        }
        if let Some(status) = input.status {
            complaint.status = status;
        }
        if let Some(answer) = &input.answer {
            complaint.answer = Some(answer.clone());
        }
        complaint.updated_at = now;
        let updated = complaint.clone();
        Ok(tables.detail(&updated))
    }

    async fn delete(&self, id: DbId) -> Result<bool, StoreError> {
        self.check_available("complaints.delete")?;
        Ok(self.tables.write().await.complaints.remove(&id).is_some())
    }
}

#[async_trait]
impl AdminStore for MemoryStore {
    async fn find_by_barcode(&self, barcode: Barcode) -> Result<Option<Admin>, StoreError> {
        self.check_available("admins.find_by_barcode")?;
        Ok(self.tables.read().await.admins.get(&barcode).cloned())
    }

    async fn create_if_absent(&self, input: &CreateAdmin) -> Result<bool, StoreError> {
        self.check_available("admins.create_if_absent")?;
        let mut tables = self.tables.write().await;
        if tables.admins.contains_key(&input.barcode) {
            return Ok(false);
        }
        let admin = Admin {
            id: self.next_admin_id.fetch_add(1, Ordering::SeqCst) + 1,
            barcode: input.barcode,
            password_hash: input.password_hash.clone(),
            role: input.role.clone(),
            created_at: Utc::now(),
        };
        tables.admins.insert(admin.barcode, admin);
        Ok(true)
    }
}

#[async_trait]
impl HealthProbe for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available("health_check")
    }
}
