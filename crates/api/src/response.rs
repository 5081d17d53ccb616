//! Shared response envelope for API handlers.
//!
//! Every success body is `{ "data": ... }`. Use [`DataResponse`] instead of
//! ad-hoc `serde_json::json!({ "data": ... })`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: complaints }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
