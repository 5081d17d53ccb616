//! Route definitions for the public `/categories` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Routes mounted at `/categories`.
///
/// ```text
/// GET /                 -> list_categories
/// GET /{id}             -> get_category
/// GET /{id}/complaints  -> list_category_complaints
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list_categories))
        .route("/{id}", get(categories::get_category))
        .route("/{id}/complaints", get(categories::list_category_complaints))
}
