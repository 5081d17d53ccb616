//! HTTP-level tests for admin login and the bearer-token guards.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    body_json, build_test_app, get_auth, post_json, seed_admin, send_raw, token_for,
    ADMIN_BARCODE, ADMIN_PASSWORD,
};
use complaints_api::auth::jwt::{verify_token, JwtConfig};
use complaints_api::test_support::{test_config, TestHarness};

#[tokio::test]
async fn login_success_returns_token() {
    let h = TestHarness::new();
    seed_admin(&h).await;

    let body = serde_json::json!({ "barcode": ADMIN_BARCODE, "password": ADMIN_PASSWORD });
    let response = post_json(build_test_app(&h), "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let token = json["data"]["token"].as_str().expect("token should be a string");
    assert_eq!(json["data"]["expires_in"], 24 * 60 * 60);
    let claims = verify_token(token, &test_config().jwt).unwrap();
    assert_eq!(claims.barcode, ADMIN_BARCODE);
}

#[tokio::test]
async fn login_wrong_password_returns_401() {
    let h = TestHarness::new();
    seed_admin(&h).await;

    let body = serde_json::json!({ "barcode": ADMIN_BARCODE, "password": "not-the-password" });
    let response = post_json(build_test_app(&h), "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn login_unknown_barcode_returns_401() {
    let h = TestHarness::new();
    seed_admin(&h).await;

    let body = serde_json::json!({ "barcode": 4242, "password": ADMIN_PASSWORD });
    let response = post_json(build_test_app(&h), "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_route_without_header_returns_401() {
    let h = TestHarness::new();
    let response = send_raw(
        build_test_app(&h),
        Method::GET,
        "/api/v1/complaints/mine",
        None,
        "",
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Missing Authorization header");
}

#[tokio::test]
async fn malformed_authorization_header_returns_401() {
    let h = TestHarness::new();
    for header in ["Token abc", "Bearer ", "bearer abc"] {
        let response = send_raw(
            build_test_app(&h),
            Method::GET,
            "/api/v1/complaints/mine",
            Some(header),
            "",
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "header {header:?}");
    }
}

#[tokio::test]
async fn token_signed_with_another_secret_returns_401() {
    let h = TestHarness::new();
    let foreign = complaints_api::auth::jwt::issue_token(
        1001,
        &JwtConfig::new("some-other-secret-of-sufficient-length"),
    )
    .unwrap();

    let response = get_auth(build_test_app(&h), "/api/v1/complaints/mine", &foreign).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn alg_none_token_returns_401() {
    let h = TestHarness::new();
    let unsigned = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJiYXJjb2RlIjoxMDAxLCJleHAiOjQxMDI0NDQ4MDAsImlhdCI6MTc2NzIyNTYwMH0.";

    let response = get_auth(build_test_app(&h), "/api/v1/complaints/mine", unsigned).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_reaches_handler() {
    let h = TestHarness::new();
    let response = get_auth(build_test_app(&h), "/api/v1/complaints/mine", &token_for(1001)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"], serde_json::json!([]));
}
