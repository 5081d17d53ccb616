//! JWT bearer-token extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use complaints_core::error::CoreError;
use complaints_core::types::Barcode;

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::state::AppState;

/// Caller identified by a valid `Authorization: Bearer <token>` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(barcode = user.barcode, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    /// The verified owner identifier from the token's claims.
    pub barcode: Barcode,
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}

/// `Ok(None)` when the header is absent; an error when it is present but
/// unusable.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let header = value
        .to_str()
        .map_err(|_| unauthorized("Authorization header is not valid ASCII"))?;
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))?;
    Ok(Some(token))
}

fn authenticate(token: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let claims = verify_token(token, &state.config.jwt).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        unauthorized("Invalid or expired token")
    })?;
    Ok(AuthUser {
        barcode: claims.barcode,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(parts)?.ok_or_else(|| unauthorized("Missing Authorization header"))?;
        authenticate(token, state)
    }
}

/// Like [`AuthUser`], but an absent header means an anonymous caller.
///
/// A header that is present and invalid is still rejected with 401; it is
/// never downgraded to anonymous.
#[derive(Debug, Clone, Copy)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            None => Ok(OptionalAuthUser(None)),
            Some(token) => authenticate(token, state).map(|user| OptionalAuthUser(Some(user))),
        }
    }
}
