//! HTTP-level tests for authentication and role gates.
//!
//! Everything here is decided before the database is touched, so the tests
//! run against a pool that never connects.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, get, get_auth, patch_json_auth, post_json, post_json_auth, token_for,
    unreachable_pool,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn protected_route_without_token_returns_401() {
    let app = common::build_test_app(unreachable_pool());
    let response = get(app, "/api/v1/arquiteto/ensaios").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_token_returns_401() {
    let app = common::build_test_app(unreachable_pool());
    let response = get_auth(app, "/api/v1/auth/session", "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_with_unknown_role_returns_401() {
    let app = common::build_test_app(unreachable_pool());
    let token = token_for(1, "ROOT");
    let response = get_auth(app, "/api/v1/modelo/ensaios", &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sixth_login_attempt_in_a_minute_is_rate_limited() {
    let app = common::build_test_app(unreachable_pool());
    let body = json!({ "email": "someone@example.com", "password": "whatever" });

    for _ in 0..5 {
        let response = post_json(app.clone(), "/api/v1/auth/login", body.clone()).await;
        assert_ne!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    let json = body_json(response).await;
    assert_eq!(json["code"], "RATE_LIMITED");
}

// ---------------------------------------------------------------------------
// Role gates
// ---------------------------------------------------------------------------

#[tokio::test]
async fn modelo_cannot_list_users() {
    let app = common::build_test_app(unreachable_pool());
    let token = token_for(7, "MODELO");
    let response = get_auth(app, "/api/v1/admin/users", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn modelo_cannot_create_ensaios() {
    let app = common::build_test_app(unreachable_pool());
    let token = token_for(7, "MODELO");
    let response = post_json_auth(
        app,
        "/api/v1/arquiteto/ensaios",
        json!({ "title": "Praia", "subject_cpf": "12345678901" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn staff_cannot_use_subject_area() {
    let app = common::build_test_app(unreachable_pool());
    let token = token_for(1, "ARQUITETO");
    let response = get_auth(app, "/api/v1/modelo/ensaios", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_superadmin_manages_certificates() {
    let app = common::build_test_app(unreachable_pool());
    let token = token_for(1, "ARQUITETO");
    let response = get_auth(app, "/api/v1/super-admin/certificates", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_writes_are_refused_as_read_only() {
    let app = common::build_test_app(unreachable_pool());
    let token = token_for(2, "ADMIN");
    let response = post_json_auth(
        app,
        "/api/v1/produtos",
        json!({ "nome": "Album", "preco_euro": 120.0 }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "admin_readonly");
}

#[tokio::test]
async fn cliente_cannot_change_intent_status() {
    let app = common::build_test_app(unreachable_pool());
    let token = token_for(9, "CLIENTE");
    let response = patch_json_auth(
        app,
        "/api/v1/intencoes/1/status",
        json!({ "status": "CONFIRMED" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "no_write_permission");
}
