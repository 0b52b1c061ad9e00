//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use portico_analytics::AnalyticsStore;
use portico_test_support::SteppingClock;
use tower::ServiceExt;
use uuid::Uuid;

use portico_api::principal::{USER_EMAIL_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
use portico_api::routes;
use portico_api::state::AppState;

/// Fixed timestamp used across all integration tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// Build the full app router with a fresh in-memory store and a
/// deterministic clock advancing one millisecond per reading. Uses the same
/// route structure as `main.rs`. Clone the returned router to issue several
/// requests against the same store.
pub fn build_test_app() -> Router {
    let clock = Arc::new(SteppingClock::new(fixed_now(), Duration::milliseconds(1)));
    let app_state = AppState::new(Arc::new(AnalyticsStore::new()), clock);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/analytics", routes::analytics::router())
        .with_state(app_state)
}

/// Headers for a verified admin principal, as the upstream gateway attaches.
pub fn admin_headers() -> Vec<(&'static str, String)> {
    vec![
        (USER_ID_HEADER, Uuid::new_v4().to_string()),
        (USER_EMAIL_HEADER, "admin@portico.test".to_owned()),
        (USER_ROLE_HEADER, "admin".to_owned()),
    ]
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request carrying the given headers and return the response.
pub async fn get_json_with_headers(
    app: Router,
    uri: &str,
    headers: &[(&str, String)],
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, value);
    }
    let request = builder.body(Body::empty()).unwrap();

    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
