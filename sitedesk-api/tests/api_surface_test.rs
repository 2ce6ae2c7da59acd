/// API surface tests that run without a database
///
/// Everything here fails (or succeeds) before the first query: missing and
/// invalid credentials, the failure envelope shape, CORS preflight, and the
/// security header stack. The router is built over a lazy pool pointing at
/// an unreachable address.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, request, router_without_db, TEST_JWT_SECRET};
use serde_json::json;
use sitedesk_shared::auth::jwt::{create_token, Claims};
use sitedesk_shared::models::user::GlobalRole;
use tower::Service as _;
use uuid::Uuid;

/// Mints a token the router will accept
fn valid_token(company_id: Option<Uuid>) -> String {
    let claims = Claims::new(Uuid::new_v4(), GlobalRole::Member, company_id);
    create_token(&claims, TEST_JWT_SECRET).unwrap()
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let mut app = router_without_db();

    let response = app
        .call(request(Method::GET, "/api/projects", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unauthorized");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_malformed_token_rejected() {
    let mut app = router_without_db();

    let response = app
        .call(request(
            Method::GET,
            "/api/notifications",
            Some("not.a.token"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "unauthorized");
}

#[tokio::test]
async fn test_token_with_wrong_secret_rejected() {
    let claims = Claims::new(Uuid::new_v4(), GlobalRole::Admin, None);
    let forged = create_token(&claims, "some-other-secret-some-other-secret!!").unwrap();

    let mut app = router_without_db();
    let response = app
        .call(request(Method::GET, "/api/projects", Some(&forged), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validation_failure_is_400_with_envelope() {
    let token = valid_token(Some(Uuid::new_v4()));
    let mut app = router_without_db();

    // Empty name fails validation before any persistence call
    let response = app
        .call(request(
            Method::POST,
            "/api/projects",
            Some(&token),
            Some(json!({ "name": "" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_companyless_user_cannot_create_projects() {
    let token = valid_token(None);
    let mut app = router_without_db();

    let response = app
        .call(request(
            Method::POST,
            "/api/projects",
            Some(&token),
            Some(json!({ "name": "Harbor Revamp" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "forbidden");
}

#[tokio::test]
async fn test_missing_id_parameter_is_400() {
    let token = valid_token(Some(Uuid::new_v4()));
    let mut app = router_without_db();

    let response = app
        .call(request(
            Method::DELETE,
            "/api/projects",
            Some(&token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "bad_request");
}

#[tokio::test]
async fn test_preflight_options_returns_ok() {
    let mut app = router_without_db();

    let preflight = axum::http::Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/projects")
        .header("origin", "https://app.sitedesk.io")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "authorization,content-type")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = app.call(preflight).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_some());
}

#[tokio::test]
async fn test_security_headers_present() {
    let mut app = router_without_db();

    let response = app
        .call(request(Method::GET, "/health", None, None))
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    // Dev-mode router: no HSTS
    assert!(headers.get("Strict-Transport-Security").is_none());
}

#[tokio::test]
async fn test_health_degrades_without_database() {
    let mut app = router_without_db();

    let response = app
        .call(request(Method::GET, "/health", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let mut app = router_without_db();

    let response = app
        .call(request(Method::GET, "/api/blueprints", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
