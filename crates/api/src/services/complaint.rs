//! Complaint use cases.
//!
//! Writes go to the store first and invalidate [`cache_keys::complaint_write`]
//! only after the store acknowledged them. The full list is read through the
//! cache; single complaints and filtered lists always come from the store.
//!
//! A list read that misses, loads from the store, and stores its result after
//! a concurrent write has invalidated the key leaves the pre-write list cached
//! until the TTL expires.

use std::sync::Arc;

use complaints_cache::CacheAside;
use complaints_core::cache_keys;
use complaints_core::complaint::{self, ComplaintStatus};
use complaints_core::error::CoreError;
use complaints_core::types::{Barcode, DbId};
use complaints_db::models::complaint::{ComplaintDetail, NewComplaint, UpdateComplaint};
use complaints_db::store::{CategoryStore, ComplaintStore, StoreError};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use super::rate_gate::{RateGate, SubmissionStatus};

/// A complaint submission, owner already resolved from token or body.
#[derive(Debug, Clone)]
pub struct SubmitComplaint {
    pub barcode: Barcode,
    pub category_id: DbId,
    pub message: String,
}

/// Result of a successful submission: the new id and the category's canned
/// answer, shown to the submitter straight away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedComplaint {
    pub id: DbId,
    pub answer: String,
}

pub struct ComplaintService {
    complaints: Arc<dyn ComplaintStore>,
    categories: Arc<dyn CategoryStore>,
    cache: CacheAside,
    gate: RateGate,
    clock: Arc<dyn Clock>,
}

/// A foreign-key violation on a complaint write means the category is gone.
fn category_fk(category_id: Option<DbId>) -> impl FnOnce(StoreError) -> CoreError {
    move |err| {
        if err.is_foreign_key_violation() {
            match category_id {
                Some(id) => CoreError::InvalidInput(format!("Category {id} does not exist")),
                None => CoreError::InvalidInput("Category does not exist".into()),
            }
        } else {
            err.into()
        }
    }
}

impl ComplaintService {
    pub fn new(
        complaints: Arc<dyn ComplaintStore>,
        categories: Arc<dyn CategoryStore>,
        cache: CacheAside,
        gate: RateGate,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            complaints,
            categories,
            cache,
            gate,
            clock,
        }
    }

    /// Validate, rate-gate, insert, invalidate.
    pub async fn create(&self, input: SubmitComplaint) -> Result<SubmittedComplaint, CoreError> {
        complaint::validate_barcode(input.barcode)?;
        complaint::validate_message(&input.message)?;

        let now = self.clock.utc();
        self.gate.ensure_allowed(input.barcode, now).await?;

        let category = self
            .categories
            .find_by_id(input.category_id)
            .await?
            .ok_or_else(|| {
                CoreError::InvalidInput(format!("Category {} does not exist", input.category_id))
            })?;

        let created = self
            .complaints
            .create(&NewComplaint {
                barcode: input.barcode,
                category_id: input.category_id,
                message: input.message.trim().to_string(),
                created_at: now,
            })
            .await
            .map_err(category_fk(Some(input.category_id)))?;

        self.cache.invalidate(&cache_keys::complaint_write()).await;

        tracing::info!(
            complaint_id = %created.id,
            barcode = created.barcode,
            category_id = %created.category_id,
            "Complaint created",
        );

        Ok(SubmittedComplaint {
            id: created.id,
            answer: category.answer,
        })
    }

    pub async fn list(&self) -> Result<Vec<ComplaintDetail>, CoreError> {
        if let Some(cached) = self.cache.get_json(cache_keys::COMPLAINTS_ALL).await {
            return Ok(cached);
        }
        let complaints = self.complaints.list().await?;
        self.cache
            .put_json(cache_keys::COMPLAINTS_ALL, &complaints)
            .await;
        Ok(complaints)
    }

    pub async fn get(&self, id: DbId) -> Result<ComplaintDetail, CoreError> {
        self.complaints
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Complaint", id))
    }

    pub async fn list_by_barcode(&self, barcode: Barcode) -> Result<Vec<ComplaintDetail>, CoreError> {
        Ok(self.complaints.list_by_barcode(barcode).await?)
    }

    /// Complaints filed under a category; `NotFound` if the category is absent.
    pub async fn list_by_category(
        &self,
        category_id: DbId,
    ) -> Result<Vec<ComplaintDetail>, CoreError> {
        if self.categories.find_by_id(category_id).await?.is_none() {
            return Err(CoreError::not_found("Category", category_id));
        }
        Ok(self.complaints.list_by_category(category_id).await?)
    }

    pub async fn submission_status(&self, barcode: Barcode) -> Result<SubmissionStatus, CoreError> {
        complaint::validate_barcode(barcode)?;
        self.gate.status(barcode).await
    }

    /// Admin content update. Absent fields are left unchanged.
    pub async fn update(
        &self,
        id: DbId,
        input: UpdateComplaint,
    ) -> Result<ComplaintDetail, CoreError> {
        let mut input = input;
        if let Some(message) = &input.message {
            complaint::validate_message(message)?;
            input.message = Some(message.trim().to_string());
        }
        if let Some(answer) = &input.answer {
            complaint::validate_answer(answer)?;
        }

        let updated = self
            .complaints
            .update(id, &input, self.clock.utc())
            .await
            .map_err(category_fk(input.category_id))?
            .ok_or_else(|| CoreError::not_found("Complaint", id))?;

        self.cache.invalidate(&cache_keys::complaint_write()).await;
        tracing::info!(complaint_id = %id, "Complaint updated");
        Ok(updated)
    }

    /// Admin triage: set the status and, optionally, an answer.
    pub async fn update_status(
        &self,
        id: DbId,
        status: ComplaintStatus,
        answer: Option<String>,
    ) -> Result<ComplaintDetail, CoreError> {
        if let Some(answer) = &answer {
            complaint::validate_answer(answer)?;
        }
        let input = UpdateComplaint {
            status: Some(status),
            answer,
            ..Default::default()
        };

        let updated = self
            .complaints
            .update(id, &input, self.clock.utc())
            .await?
            .ok_or_else(|| CoreError::not_found("Complaint", id))?;

        self.cache.invalidate(&cache_keys::complaint_write()).await;
        tracing::info!(complaint_id = %id, %status, "Complaint status changed");
        Ok(updated)
    }

    /// Delete a complaint. A second delete of the same id is `NotFound`.
    pub async fn delete(&self, id: DbId) -> Result<(), CoreError> {
        if !self.complaints.delete(id).await? {
            return Err(CoreError::not_found("Complaint", id));
        }
        self.cache.invalidate(&cache_keys::complaint_write()).await;
        tracing::info!(complaint_id = %id, "Complaint deleted");
        Ok(())
    }

    /// Whether `barcode` owns complaint `id`. `NotFound` if it does not exist.
    pub async fn can_user_delete(&self, id: DbId, barcode: Barcode) -> Result<bool, CoreError> {
        let owner = self
            .complaints
            .find_owner(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Complaint", id))?;
        Ok(owner == barcode)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use complaints_cache::Cache;
    use complaints_db::models::category::{Category, CreateCategory};
    use uuid::Uuid;

    use super::*;
    use crate::test_support::TestHarness;

    async fn seed_category(h: &TestHarness, title: &str) -> Category {
        CategoryStore::create(
            h.store.as_ref(),
            &CreateCategory {
                title: title.into(),
                description: "Dormitory issues".into(),
                answer: "Facilities will visit within 48 hours.".into(),
            },
        )
        .await
        .unwrap()
    }

    fn submission(barcode: Barcode, category_id: DbId) -> SubmitComplaint {
        SubmitComplaint {
            barcode,
            category_id,
            message: "The heating in room 214 is broken".into(),
        }
    }

    #[tokio::test]
    async fn owner_1001_is_rate_limited_then_allowed_after_61_minutes() {
        let h = TestHarness::new();
        let category = seed_category(&h, "Dorm").await;
        let service = &h.state.complaints;

        let first = service.create(submission(1001, category.id)).await.unwrap();
        assert_eq!(first.answer, "Facilities will visit within 48 hours.");

        let err = service.create(submission(1001, category.id)).await.unwrap_err();
        assert_matches!(err, CoreError::RateLimited { .. });

        h.clock.advance_minutes(61);
        let third = service.create(submission(1001, category.id)).await.unwrap();
        assert_ne!(third.id, first.id);
        assert_eq!(service.list_by_barcode(1001).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn other_owners_are_not_throttled() {
        let h = TestHarness::new();
        let category = seed_category(&h, "Dorm").await;
        let service = &h.state.complaints;

        service.create(submission(1001, category.id)).await.unwrap();
        service.create(submission(1002, category.id)).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_category_is_invalid_input() {
        let h = TestHarness::new();
        let err = h
            .state
            .complaints
            .create(submission(1001, Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::InvalidInput(_));
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_the_gate() {
        let h = TestHarness::new();
        let category = seed_category(&h, "Dorm").await;
        let service = &h.state.complaints;

        let blank = SubmitComplaint {
            message: "   ".into(),
            ..submission(1001, category.id)
        };
        assert_matches!(service.create(blank).await, Err(CoreError::InvalidInput(_)));
        assert_matches!(
            service.create(submission(0, category.id)).await,
            Err(CoreError::InvalidInput(_))
        );
        // Nothing was stored, so the owner is still free to submit.
        assert!(service.submission_status(1001).await.unwrap().can_submit);
    }

    #[tokio::test]
    async fn list_is_cached_and_every_write_invalidates_it() {
        let h = TestHarness::new();
        let category = seed_category(&h, "Dorm").await;
        let service = &h.state.complaints;

        assert!(service.list().await.unwrap().is_empty());
        assert!(h.cache.contains(cache_keys::COMPLAINTS_ALL).await);

        let created = service.create(submission(1001, category.id)).await.unwrap();
        assert!(!h.cache.contains(cache_keys::COMPLAINTS_ALL).await);
        assert_eq!(service.list().await.unwrap().len(), 1);

        service
            .update_status(created.id, ComplaintStatus::Approved, Some("Fixed".into()))
            .await
            .unwrap();
        assert!(!h.cache.contains(cache_keys::COMPLAINTS_ALL).await);
        assert_eq!(service.list().await.unwrap()[0].status, ComplaintStatus::Approved);

        service
            .update(
                created.id,
                UpdateComplaint {
                    message: Some("Heating fixed, radiator still leaks".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!h.cache.contains(cache_keys::COMPLAINTS_ALL).await);
        service.list().await.unwrap();

        service.delete(created.id).await.unwrap();
        assert!(!h.cache.contains(cache_keys::COMPLAINTS_ALL).await);
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_serves_from_cache_until_invalidated() {
        let h = TestHarness::new();
        let category = seed_category(&h, "Dorm").await;
        let service = &h.state.complaints;
        service.list().await.unwrap();

        // A write that bypasses the service is invisible until the TTL or an
        // invalidation.
        ComplaintStore::create(
            h.store.as_ref(),
            &NewComplaint {
                barcode: 5,
                category_id: category.id,
                message: "direct".into(),
                created_at: h.clock.utc(),
            },
        )
        .await
        .unwrap();
        assert!(service.list().await.unwrap().is_empty());

        h.cache.delete(cache_keys::COMPLAINTS_ALL).await.unwrap();
        assert_eq!(service.list().await.unwrap().len(), 1);
        assert_eq!(h.observer.hits(), 1);
    }

    #[tokio::test]
    async fn get_by_id_reads_the_store_and_joins_category() {
        let h = TestHarness::new();
        let category = seed_category(&h, "Dorm").await;
        let service = &h.state.complaints;
        let created = service.create(submission(1001, category.id)).await.unwrap();

        let detail = service.get(created.id).await.unwrap();
        assert_eq!(detail.category_title, "Dorm");
        assert_eq!(detail.status, ComplaintStatus::Pending);
        assert_matches!(
            service.get(Uuid::new_v4()).await,
            Err(CoreError::NotFound { entity: "Complaint", .. })
        );
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let h = TestHarness::new();
        let category = seed_category(&h, "Dorm").await;
        let service = &h.state.complaints;
        let created = service.create(submission(1001, category.id)).await.unwrap();

        service.delete(created.id).await.unwrap();
        assert_matches!(
            service.delete(created.id).await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn ownership_check() {
        let h = TestHarness::new();
        let category = seed_category(&h, "Dorm").await;
        let service = &h.state.complaints;
        let created = service.create(submission(1001, category.id)).await.unwrap();

        assert!(service.can_user_delete(created.id, 1001).await.unwrap());
        assert!(!service.can_user_delete(created.id, 1002).await.unwrap());
        assert_matches!(
            service.can_user_delete(Uuid::new_v4(), 1001).await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn update_validates_message_and_category() {
        let h = TestHarness::new();
        let category = seed_category(&h, "Dorm").await;
        let service = &h.state.complaints;
        let created = service.create(submission(1001, category.id)).await.unwrap();

        let blank_message = UpdateComplaint {
            message: Some("   ".into()),
            ..Default::default()
        };
        assert_matches!(
            service.update(created.id, blank_message).await,
            Err(CoreError::InvalidInput(_))
        );

        let bad_category = UpdateComplaint {
            category_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert_matches!(
            service.update(created.id, bad_category).await,
            Err(CoreError::InvalidInput(_))
        );

        let moved = seed_category(&h, "Food").await;
        let updated = service
            .update(
                created.id,
                UpdateComplaint {
                    category_id: Some(moved.id),
                    status: Some(ComplaintStatus::Rejected),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.category_title, "Food");
        assert_eq!(updated.status, ComplaintStatus::Rejected);
    }

    #[tokio::test]
    async fn unavailable_cache_degrades_to_the_store() {
        let h = TestHarness::with_unavailable_cache();
        let category = seed_category(&h, "Dorm").await;
        let service = &h.state.complaints;

        service.create(submission(1001, category.id)).await.unwrap();
        assert_eq!(service.list().await.unwrap().len(), 1);
        // invalidate on create, then get + set on list
        assert_eq!(h.observer.failures(), 3);
    }

    #[tokio::test]
    async fn list_by_category_requires_the_category() {
        let h = TestHarness::new();
        let dorm = seed_category(&h, "Dorm").await;
        let food = seed_category(&h, "Food").await;
        let service = &h.state.complaints;
        service.create(submission(1001, dorm.id)).await.unwrap();

        assert_eq!(service.list_by_category(dorm.id).await.unwrap().len(), 1);
        assert!(service.list_by_category(food.id).await.unwrap().is_empty());
        assert_matches!(
            service.list_by_category(Uuid::new_v4()).await,
            Err(CoreError::NotFound { entity: "Category", .. })
        );
    }

    #[tokio::test]
    async fn store_outage_is_internal() {
        let h = TestHarness::new();
        h.store.set_unavailable(true);
        assert_matches!(
            h.state.complaints.get(Uuid::new_v4()).await,
            Err(CoreError::Internal(_))
        );
    }
}
