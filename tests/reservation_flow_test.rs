//! End-to-end booking, extension and expiry over HTTP.

mod common;

use chrono::{DateTime, Duration, Utc};
use http::StatusCode;
use serde_json::json;

use common::TestApp;

fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    value
        .as_str()
        .expect("timestamp is a string")
        .parse()
        .expect("timestamp parses")
}

#[tokio::test]
async fn test_booking_is_released_after_the_window() {
    let app = TestApp::new();
    app.seeded().await;
    let (_, token) = app.customer("user1").await;
    let t0 = app.now();

    let response = app.book(&token, &[3, 4], "S/5").await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let reservation = response.data();
    assert_eq!(reservation["price"]["total"], 10);
    assert_eq!(reservation["points"]["total"], 12);
    assert_eq!(reservation["state"], "active");
    assert_eq!(
        timestamp(&reservation["schedule"]["end"]),
        t0 + Duration::minutes(180)
    );
    let id = reservation["id"].as_str().unwrap().to_string();

    assert_eq!(app.booth_state(3).await, "reserved");
    assert_eq!(app.booth_state(4).await, "reserved");
    assert_eq!(app.booth_state(5).await, "free");

    app.advance_minutes(181);
    assert_eq!(app.booth_state(3).await, "free");
    assert_eq!(app.booth_state(4).await, "free");

    let response = app
        .request("GET", &format!("/api/reservations/{id}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["state"], "completed");
}

#[tokio::test]
async fn test_extension_moves_the_end_and_adds_points() {
    let app = TestApp::new();
    app.seeded().await;
    let (_, token) = app.customer("user1").await;
    let t0 = app.now();

    let response = app.book(&token, &[3, 4], "S/5").await;
    let id = response.data()["id"].as_str().unwrap().to_string();

    app.advance_minutes(30);
    let response = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/extend"),
            Some(json!({ "planId": "S/2" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let reservation = response.data();
    assert_eq!(
        timestamp(&reservation["schedule"]["end"]),
        t0 + Duration::minutes(240)
    );
    assert_eq!(reservation["points"]["total"], 16);
    assert_eq!(reservation["extensions"].as_array().unwrap().len(), 1);
    assert_eq!(reservation["state"], "active");

    // Still held past the original end.
    app.advance_minutes(160);
    assert_eq!(app.booth_state(3).await, "reserved");

    let rewards = app.request("GET", "/api/rewards/me", None, Some(&token)).await;
    assert_eq!(rewards.data()["account"]["pointsCurrent"], 16);
}

#[tokio::test]
async fn test_held_booth_cannot_be_booked_twice() {
    let app = TestApp::new();
    app.seeded().await;
    let (_, first) = app.customer("user1").await;
    let (_, second) = app.customer("user2").await;

    let response = app.book(&first, &[2, 3], "S/2").await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app.book(&second, &[3, 4, 2], "S/2").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "BOOTH_UNAVAILABLE");
    assert_eq!(response.body["details"]["unavailable"], json!([2, 3]));
    assert_eq!(app.booth_state(4).await, "free");
}

#[tokio::test]
async fn test_unknown_plan_is_rejected() {
    let app = TestApp::new();
    app.seeded().await;
    let (_, token) = app.customer("user1").await;

    let response = app.book(&token, &[1], "S/99").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_PLAN");

    let response = app.book(&token, &[], "S/2").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_cancel_frees_booths() {
    let app = TestApp::new();
    app.seeded().await;
    let (_, token) = app.customer("user1").await;

    let response = app.book(&token, &[7], "S/1").await;
    let id = response.data()["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/cancel"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["state"], "cancelled");
    assert_eq!(app.booth_state(7).await, "free");

    let response = app
        .request(
            "POST",
            &format!("/api/reservations/{id}/cancel"),
            Some(json!({ "reason": "again" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_listing_shows_only_own_reservations() {
    let app = TestApp::new();
    app.seeded().await;
    let (_, first) = app.customer("user1").await;
    let (second_id, second) = app.customer("user2").await;

    app.book(&first, &[1], "S/2").await;
    app.book(&second, &[2], "S/2").await;
    app.book(&second, &[5], "S/1").await;

    let response = app.request("GET", "/api/reservations", None, Some(&second)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data().as_array().unwrap().len(), 2);

    let response = app
        .request(
            "GET",
            &format!("/api/reservations?userId={second_id}"),
            None,
            Some(&first),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
