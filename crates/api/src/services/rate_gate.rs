//! Store-backed submission rate gate.
//!
//! Reads the owner's most recent `created_at` and applies
//! [`complaints_core::rate_gate::evaluate`] at the injected clock's `now`.
//! The read and the later insert are not atomic.

use std::sync::Arc;

use complaints_core::error::CoreError;
use complaints_core::rate_gate::{self, SubmissionDecision};
use complaints_core::types::{Barcode, Timestamp};
use complaints_db::store::ComplaintStore;
use mockable::Clock;
use serde::Serialize;

/// Answer to "may this owner submit now?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionStatus {
    pub can_submit: bool,
    /// `None` if the owner has never submitted.
    pub next_allowed_at: Option<Timestamp>,
}

#[derive(Clone)]
pub struct RateGate {
    complaints: Arc<dyn ComplaintStore>,
    clock: Arc<dyn Clock>,
}

impl RateGate {
    pub fn new(complaints: Arc<dyn ComplaintStore>, clock: Arc<dyn Clock>) -> Self {
        Self { complaints, clock }
    }

    /// Decide for `barcode` at `now`.
    pub async fn decide(
        &self,
        barcode: Barcode,
        now: Timestamp,
    ) -> Result<SubmissionDecision, CoreError> {
        let last = self.complaints.last_created_at(barcode).await?;
        Ok(rate_gate::evaluate(last, now))
    }

    /// `Err(RateLimited)` if `barcode` submitted less than an hour before `now`.
    pub async fn ensure_allowed(&self, barcode: Barcode, now: Timestamp) -> Result<(), CoreError> {
        match self.decide(barcode, now).await? {
            SubmissionDecision::Allowed => Ok(()),
            SubmissionDecision::Denied { next_allowed_at } => {
                tracing::info!(barcode, %next_allowed_at, "Complaint submission rate limited");
                Err(CoreError::RateLimited { next_allowed_at })
            }
        }
    }

    pub async fn can_submit(&self, barcode: Barcode) -> Result<bool, CoreError> {
        Ok(self.decide(barcode, self.clock.utc()).await?.is_allowed())
    }

    pub async fn status(&self, barcode: Barcode) -> Result<SubmissionStatus, CoreError> {
        let last = self.complaints.last_created_at(barcode).await?;
        let decision = rate_gate::evaluate(last, self.clock.utc());
        Ok(SubmissionStatus {
            can_submit: decision.is_allowed(),
            next_allowed_at: rate_gate::next_allowed_at(last),
        })
    }
}
