pub mod admin;
pub mod auth;
pub mod categories;
pub mod complaints;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                          admin login (public)
///
/// /complaints                          list (cached), submit (optional auth)
/// /complaints/can-submit?barcode=      rate-gate probe
/// /complaints/mine                     caller's complaints (auth required)
/// /complaints/{id}                     get, delete (owner only)
///
/// /categories                          list (cached)
/// /categories/{id}                     get (cached)
/// /categories/{id}/complaints          complaints in a category
///
/// /admin/complaints/{id}               update, delete (admin only)
/// /admin/complaints/{id}/status        status + answer (admin only)
/// /admin/categories                    create (admin only)
/// /admin/categories/{id}               update, delete (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/complaints", complaints::router())
        .nest("/categories", categories::router())
        .nest("/admin", admin::router())
}
