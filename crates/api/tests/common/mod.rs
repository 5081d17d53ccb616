//! Shared helpers for the HTTP integration tests.
//!
//! Requests go through [`build_app_router`] over a [`TestHarness`], so every
//! test runs behind the production middleware stack against the in-memory
//! store and cache.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use complaints_api::auth::jwt::issue_token;
use complaints_api::config::AdminBootstrap;
use complaints_api::router::build_app_router;
use complaints_api::test_support::{test_config, TestHarness};
use complaints_core::types::Barcode;
use complaints_db::models::category::{Category, CreateCategory};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const ADMIN_BARCODE: Barcode = 900;
pub const ADMIN_PASSWORD: &str = "front-desk-2026";

/// Build the application router over the harness state.
pub fn build_test_app(h: &TestHarness) -> Router {
    build_app_router(h.state.clone(), &test_config())
}

/// A token for `barcode` signed with the test secret.
pub fn token_for(barcode: Barcode) -> String {
    issue_token(barcode, &test_config().jwt).expect("token should be issued")
}

/// Seed the admin account and return a token for it.
pub async fn seed_admin(h: &TestHarness) -> String {
    h.state
        .admins
        .bootstrap(&AdminBootstrap {
            barcode: ADMIN_BARCODE,
            password: ADMIN_PASSWORD.into(),
        })
        .await
        .expect("admin bootstrap should succeed");
    token_for(ADMIN_BARCODE)
}

/// Create a category straight through the service.
pub async fn seed_category(h: &TestHarness, title: &str) -> Category {
    h.state
        .categories
        .create(CreateCategory {
            title: title.into(),
            description: format!("{title} issues"),
            answer: format!("Thanks, the {title} team has been notified."),
        })
        .await
        .expect("category creation should succeed")
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("router is infallible")
}

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

/// Send a request with a raw body and an explicit `Authorization` value.
pub async fn send_raw(
    app: Router,
    method: Method,
    uri: &str,
    authorization: Option<&str>,
    body: &str,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        builder = builder.header(AUTHORIZATION, value);
    }
    send(app, builder.body(Body::from(body.to_owned())).expect("request should build")).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
