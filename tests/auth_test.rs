//! Registration, login and access control over HTTP.

mod common;

use http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn test_register_login_and_profile() {
    let app = TestApp::new();
    let (id, token) = app.customer("gamer").await;

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["id"], id.to_string());
    assert_eq!(response.data()["role"], "customer");
    assert_eq!(response.data()["tier"]["tier"], "bronze");
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = TestApp::new();
    app.register("gamer").await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "gamer2",
                "email": "GAMER@lanhub.test",
                "password": "secret123",
                "firstName": "Otro",
                "lastName": "Jugador",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "CONFLICT");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.register("gamer").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "gamer@lanhub.test", "password": "nope-nope" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_need_a_token() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/reservations", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/auth/me", None, Some("not-a-token"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_reject_customers() {
    let app = TestApp::new();
    let (_, token) = app.customer("gamer").await;

    let response = app.request("POST", "/api/sites/seed", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("POST", "/api/maintenance/sweep", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
