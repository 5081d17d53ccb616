//! Route definitions for `/admin`. Every handler here takes `RequireAdmin`.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::{categories, complaints};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// PUT    /complaints/{id}         -> admin_update_complaint
/// DELETE /complaints/{id}         -> admin_delete_complaint
/// PUT    /complaints/{id}/status  -> admin_update_status
/// POST   /categories              -> create_category
/// PUT    /categories/{id}         -> update_category
/// DELETE /categories/{id}         -> delete_category
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/complaints/{id}",
            put(complaints::admin_update_complaint).delete(complaints::admin_delete_complaint),
        )
        .route("/complaints/{id}/status", put(complaints::admin_update_status))
        .route("/categories", post(categories::create_category))
        .route(
            "/categories/{id}",
            put(categories::update_category).delete(categories::delete_category),
        )
}
