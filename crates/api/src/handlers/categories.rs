//! Handlers for categories: public reads and admin management.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use complaints_core::types::DbId;
use complaints_db::models::category::{CreateCategory, UpdateCategory};

use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories = state.categories.list().await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/v1/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let category = state.categories.get(id).await?;
    Ok(Json(DataResponse { data: category }))
}

/// GET /api/v1/categories/{id}/complaints
pub async fn list_category_complaints(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let complaints = state.complaints.list_by_category(id).await?;
    Ok(Json(DataResponse { data: complaints }))
}

/// POST /api/v1/admin/categories
pub async fn create_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    let category = state.categories.create(input).await?;
    tracing::debug!(category_id = %category.id, admin = admin.barcode, "Admin created category");
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /api/v1/admin/categories/{id}
///
/// Partially update a category.
pub async fn update_category(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateCategory>,
) -> AppResult<impl IntoResponse> {
    let category = state.categories.update(id, input).await?;
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/admin/categories/{id}
///
/// 409 while complaints still reference the category.
pub async fn delete_category(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    state.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
