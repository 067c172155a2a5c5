// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use marquee_api::LoginResponse;
use marquee_persistence::Persistence;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::security::RateLimits;
use crate::{AppState, ServerConfig, build_router};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const TEST_PASSWORD: &str = "correct-Horse-9";

/// App state over an in-memory database with generous rate limits.
pub fn create_test_app_state() -> AppState {
    create_limited_app_state(10_000, 10_000)
}

pub fn create_limited_app_state(api_per_minute: u32, credentials_per_minute: u32) -> AppState {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    let rate_limits: RateLimits =
        RateLimits::new(api_per_minute, credentials_per_minute).expect("rate limits");
    AppState::new(
        persistence,
        rate_limits,
        ServerConfig {
            demo_occupancy: 0,
            secure_cookies: false,
        },
    )
}

pub fn create_test_app() -> (AppState, Router) {
    let app_state: AppState = create_test_app_state();
    let app: Router = build_router(app_state.clone());
    (app_state, app)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub fn bearer_request(method: &str, uri: &str, token: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json<T: DeserializeOwned>(response: Response) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body_bytes.to_vec()).unwrap()
}

pub async fn login(app: &Router, email: &str) -> LoginResponse {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": email, "password": TEST_PASSWORD }),
        ),
    )
    .await;
    assert!(response.status().is_success(), "login failed for {email}");
    body_json(response).await
}

/// Creates the first admin through the bootstrap endpoint and signs in.
pub async fn bootstrap_and_login(app: &Router) -> LoginResponse {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/auth/bootstrap",
            &json!({
                "email": ADMIN_EMAIL,
                "display_name": "First Admin",
                "password": TEST_PASSWORD,
                "password_confirmation": TEST_PASSWORD,
            }),
        ),
    )
    .await;
    assert!(response.status().is_success(), "bootstrap failed");
    login(app, ADMIN_EMAIL).await
}

/// Registers a customer account and signs in.
pub async fn register_and_login(app: &Router, email: &str) -> LoginResponse {
    let response = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            &json!({
                "email": email,
                "display_name": "Film Fan",
                "password": TEST_PASSWORD,
                "password_confirmation": TEST_PASSWORD,
            }),
        ),
    )
    .await;
    assert!(response.status().is_success(), "register failed for {email}");
    login(app, email).await
}
