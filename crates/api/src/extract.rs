//! Extractors whose rejections are [`AppError`]s.
//!
//! axum's stock `Json`, `Path`, and `Query` reject with plain-text bodies.
//! These wrappers keep malformed input inside the `{ "error", "code" }`
//! envelope as a 400.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
