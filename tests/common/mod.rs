//! Shared helpers for the HTTP end-to-end tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::{DateTime, Duration, Utc};
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use lanhub_core::config::{AppConfig, StoreProvider};
use lanhub_core::traits::ManualClock;
use lanhub_core::types::UserId;
use lanhub_database::Stores;
use lanhub_entity::user::UserRole;

/// Test application over the in-memory store and a controllable clock.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Direct access to the stores
    pub stores: Stores,
    /// Clock read by every service
    pub clock: ManualClock,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application with an empty store
    pub fn new() -> Self {
        let mut config = AppConfig::load_from("tests/fixtures", "test")
            .expect("Failed to load test config");
        config.database.provider = StoreProvider::Memory;

        let stores = Stores::memory();
        let clock = ManualClock::new(Utc::now());
        let state = lanhub_api::build_state(config.clone(), stores.clone(), Arc::new(clock.clone()));
        let router = lanhub_api::build_app(state);

        Self {
            router,
            stores,
            clock,
            config,
        }
    }

    /// Current test time
    pub fn now(&self) -> DateTime<Utc> {
        use lanhub_core::traits::Clock;
        self.clock.now()
    }

    /// Move the clock forward
    pub fn advance_minutes(&self, minutes: i64) {
        self.clock.advance(Duration::minutes(minutes));
    }

    /// Register a customer and return their id
    pub async fn register(&self, username: &str) -> UserId {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(json!({
                    "username": username,
                    "email": format!("{username}@lanhub.test"),
                    "password": "secret123",
                    "firstName": "Test",
                    "lastName": username,
                })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Register failed: {:?}",
            response.body
        );
        response.data()["id"]
            .as_str()
            .expect("No id in register response")
            .parse()
            .expect("Invalid user id")
    }

    /// Login and return the bearer token
    pub async fn login(&self, username: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({
                    "email": format!("{username}@lanhub.test"),
                    "password": "secret123",
                })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.data()["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// Register a customer and log them in
    pub async fn customer(&self, username: &str) -> (UserId, String) {
        let id = self.register(username).await;
        (id, self.login(username).await)
    }

    /// Register an administrator and log them in
    pub async fn admin(&self, username: &str) -> String {
        let id = self.register(username).await;
        assert!(
            self.stores
                .users
                .set_role(id, UserRole::Admin)
                .await
                .expect("Failed to set role")
        );
        self.login(username).await
    }

    /// Seed the reference catalog and return an admin token
    pub async fn seeded(&self) -> String {
        let token = self.admin("root").await;
        let response = self
            .request("POST", "/api/sites/seed", None, Some(&token))
            .await;
        assert_eq!(response.status, StatusCode::OK, "Seed failed: {:?}", response.body);
        token
    }

    /// Book booths at the default site
    pub async fn book(&self, token: &str, booths: &[i32], plan: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/reservations",
            Some(json!({ "boothNumbers": booths, "planId": plan })),
            Some(token),
        )
        .await
    }

    /// State of one booth of the default site
    pub async fn booth_state(&self, number: i64) -> String {
        let response = self.request("GET", "/api/booths", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
        response.data()["booths"]
            .as_array()
            .expect("No booths in listing")
            .iter()
            .find(|b| b["number"] == number)
            .and_then(|b| b["state"].as_str())
            .expect("Booth not listed")
            .to_string()
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The error code of a failure body
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
