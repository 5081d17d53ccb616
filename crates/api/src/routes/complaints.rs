//! Route definitions for the public `/complaints` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::complaints;
use crate::state::AppState;

/// Routes mounted at `/complaints`.
///
/// ```text
/// GET    /            -> list_complaints
/// POST   /            -> create_complaint
/// GET    /can-submit  -> can_submit
/// GET    /mine        -> my_complaints
/// GET    /{id}        -> get_complaint
/// DELETE /{id}        -> delete_own_complaint
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(complaints::list_complaints).post(complaints::create_complaint),
        )
        .route("/can-submit", get(complaints::can_submit))
        .route("/mine", get(complaints::my_complaints))
        .route(
            "/{id}",
            get(complaints::get_complaint).delete(complaints::delete_own_complaint),
        )
}
