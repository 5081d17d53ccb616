//! Owner-only access to a resource addressed by `{id}` in the path.

use std::marker::PhantomData;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use complaints_core::error::CoreError;
use complaints_core::types::{Barcode, DbId};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::extract::AppPath;
use crate::state::AppState;

/// A resource kind whose rows carry an owner barcode.
#[async_trait]
pub trait OwnedResource: Send + Sync + 'static {
    /// Whether `barcode` owns resource `id`. `NotFound` if `id` does not
    /// exist.
    async fn is_owner(state: &AppState, id: DbId, barcode: Barcode) -> Result<bool, CoreError>;
}

/// Complaints, owned by the barcode that submitted them.
pub struct ComplaintResource;

#[async_trait]
impl OwnedResource for ComplaintResource {
    async fn is_owner(state: &AppState, id: DbId, barcode: Barcode) -> Result<bool, CoreError> {
        state.complaints.can_user_delete(id, barcode).await
    }
}

/// Requires a valid token whose barcode owns the resource at `{id}`.
///
/// Rejects with 401 (no valid token), 400 (malformed id), 404 (no such
/// resource), or 403 (someone else's resource).
pub struct RequireOwner<R> {
    pub user: AuthUser,
    pub id: DbId,
    _resource: PhantomData<R>,
}

impl<R: OwnedResource> FromRequestParts<AppState> for RequireOwner<R> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let AppPath(id) = AppPath::<DbId>::from_request_parts(parts, state).await?;

        if !R::is_owner(state, id, user.barcode).await? {
            tracing::warn!(resource_id = %id, barcode = user.barcode, "Owner check failed");
            return Err(AppError::Core(CoreError::Forbidden(
                "You can only modify your own resources".into(),
            )));
        }

        Ok(RequireOwner {
            user,
            id,
            _resource: PhantomData,
        })
    }
}
