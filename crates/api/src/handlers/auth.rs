//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::Json;
use complaints_core::types::Barcode;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::response::DataResponse;
use crate::services::admin::IssuedToken;
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub barcode: Barcode,
    pub password: String,
}

/// POST /api/v1/auth/login
///
/// Authenticate an admin with barcode + password. Returns a bearer token.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<DataResponse<IssuedToken>>> {
    let issued = state.admins.login(input.barcode, &input.password).await?;
    Ok(Json(DataResponse { data: issued }))
}
