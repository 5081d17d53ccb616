//! Handlers for complaints.
//!
//! Public submission and reads, owner delete, and admin triage.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use complaints_core::complaint::ComplaintStatus;
use complaints_core::error::CoreError;
use complaints_core::types::{Barcode, DbId};
use complaints_db::models::complaint::UpdateComplaint;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::middleware::owner::{ComplaintResource, RequireOwner};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::services::complaint::SubmitComplaint;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /complaints`.
///
/// `barcode` is required for anonymous callers. With a valid bearer token
/// the token's barcode is used and the body field is ignored.
#[derive(Debug, Deserialize)]
pub struct CreateComplaintRequest {
    #[serde(default)]
    pub barcode: Option<Barcode>,
    pub category_id: DbId,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CanSubmitQuery {
    pub barcode: Barcode,
}

/// Request body for `PUT /admin/complaints/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub answer: Option<String>,
}

// ---------------------------------------------------------------------------
// Public endpoints
// ---------------------------------------------------------------------------

/// POST /api/v1/complaints
///
/// Submit a complaint. Rate-gated to one per hour per barcode. Returns the
/// new id and the category's canned answer.
pub async fn create_complaint(
    OptionalAuthUser(user): OptionalAuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateComplaintRequest>,
) -> AppResult<impl IntoResponse> {
    let barcode = match (user, input.barcode) {
        (Some(user), _) => user.barcode,
        (None, Some(barcode)) => barcode,
        (None, None) => {
            return Err(CoreError::InvalidInput(
                "barcode is required for anonymous submissions".into(),
            )
            .into())
        }
    };

    let submitted = state
        .complaints
        .create(SubmitComplaint {
            barcode,
            category_id: input.category_id,
            message: input.message,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: submitted })))
}

/// GET /api/v1/complaints
pub async fn list_complaints(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let complaints = state.complaints.list().await?;
    Ok(Json(DataResponse { data: complaints }))
}

/// GET /api/v1/complaints/can-submit?barcode=N
pub async fn can_submit(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CanSubmitQuery>,
) -> AppResult<impl IntoResponse> {
    let status = state.complaints.submission_status(query.barcode).await?;
    Ok(Json(DataResponse { data: status }))
}

/// GET /api/v1/complaints/mine
///
/// The caller's own complaints, newest first.
pub async fn my_complaints(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let complaints = state.complaints.list_by_barcode(user.barcode).await?;
    Ok(Json(DataResponse { data: complaints }))
}

/// GET /api/v1/complaints/{id}
pub async fn get_complaint(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let complaint = state.complaints.get(id).await?;
    Ok(Json(DataResponse { data: complaint }))
}

/// DELETE /api/v1/complaints/{id}
///
/// Owner-only delete.
pub async fn delete_own_complaint(
    owner: RequireOwner<ComplaintResource>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    state.complaints.delete(owner.id).await?;
    tracing::info!(complaint_id = %owner.id, barcode = owner.user.barcode, "Complaint deleted by owner");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Admin endpoints
// ---------------------------------------------------------------------------

/// PUT /api/v1/admin/complaints/{id}
///
/// Partial content update (category, message, status, answer).
pub async fn admin_update_complaint(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateComplaint>,
) -> AppResult<impl IntoResponse> {
    let complaint = state.complaints.update(id, input).await?;
    tracing::debug!(complaint_id = %id, admin = admin.barcode, "Admin updated complaint");
    Ok(Json(DataResponse { data: complaint }))
}

/// PUT /api/v1/admin/complaints/{id}/status
pub async fn admin_update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let status: ComplaintStatus = input.status.parse()?;
    let complaint = state
        .complaints
        .update_status(id, status, input.answer)
        .await?;
    tracing::debug!(complaint_id = %id, admin = admin.barcode, "Admin changed complaint status");
    Ok(Json(DataResponse { data: complaint }))
}

/// DELETE /api/v1/admin/complaints/{id}
pub async fn admin_delete_complaint(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    state.complaints.delete(id).await?;
    tracing::debug!(complaint_id = %id, admin = admin.barcode, "Admin deleted complaint");
    Ok(StatusCode::NO_CONTENT)
}
