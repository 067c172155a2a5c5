// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for authentication, CSRF, rate limiting and error handling.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware,
    routing::get,
};
use marquee_api::{BootstrapStatusResponse, LoginResponse, RegisterResponse, WhoAmIResponse};
use marquee_persistence::{AppLogData, LogFilter};
use serde_json::json;

use crate::error::{ErrorResponse, HttpError, record_server_errors};
use crate::routes::public::HealthResponse;
use crate::security::CSRF_HEADER;
use crate::session::SESSION_COOKIE;
use crate::tests::helpers::{
    ADMIN_EMAIL, TEST_PASSWORD, bearer_request, body_json, bootstrap_and_login,
    create_limited_app_state, create_test_app, create_test_app_state, json_request,
    register_and_login, send,
};
use crate::{AppState, build_router};

fn cookie_request(method: &str, uri: &str, session: &LoginResponse, csrf: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, format!("{SESSION_COOKIE}={}", session.session_token))
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(csrf) = csrf {
        builder = builder.header(CSRF_HEADER, csrf);
    }
    builder
        .body(Body::from(
            serde_json::to_string(&json!({ "display_name": "Renamed Fan" })).unwrap(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_healthz_reports_ok() {
    let (_, app) = create_test_app();

    let response = send(
        &app,
        Request::builder().uri("/healthz").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = body_json(response).await;
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_bootstrap_is_only_allowed_once() {
    let (_, app) = create_test_app();

    let status = send(
        &app,
        Request::builder()
            .uri("/api/auth/bootstrap")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let status: BootstrapStatusResponse = body_json(status).await;
    assert!(status.needs_bootstrap);

    let admin: LoginResponse = bootstrap_and_login(&app).await;
    assert_eq!(admin.email, ADMIN_EMAIL);
    assert_eq!(admin.roles, vec![String::from("admin")]);

    let again = send(
        &app,
        json_request(
            "POST",
            "/api/auth/bootstrap",
            &json!({
                "email": "second@example.com",
                "display_name": "Second Admin",
                "password": TEST_PASSWORD,
                "password_confirmation": TEST_PASSWORD,
            }),
        ),
    )
    .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let status = send(
        &app,
        Request::builder()
            .uri("/api/auth/bootstrap")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let status: BootstrapStatusResponse = body_json(status).await;
    assert!(!status.needs_bootstrap);
}

#[tokio::test]
async fn test_register_returns_created() {
    let (_, app) = create_test_app();

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            &json!({
                "email": "fan@example.com",
                "display_name": "Film Fan",
                "password": TEST_PASSWORD,
                "password_confirmation": TEST_PASSWORD,
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let registered: RegisterResponse = body_json(response).await;
    assert_eq!(registered.email, "fan@example.com");
}

#[tokio::test]
async fn test_weak_password_is_bad_request() {
    let (_, app) = create_test_app();

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/auth/register",
            &json!({
                "email": "fan@example.com",
                "display_name": "Film Fan",
                "password": "short",
                "password_confirmation": "short",
            }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = body_json(response).await;
    assert!(error.error);
}

#[tokio::test]
async fn test_login_sets_http_only_session_cookie() {
    let (_, app) = create_test_app();
    bootstrap_and_login(&app).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": ADMIN_EMAIL, "password": TEST_PASSWORD }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie: String = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    let session: LoginResponse = body_json(response).await;

    assert!(cookie.starts_with(&format!("{SESSION_COOKIE}={}", session.session_token)));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let (_, app) = create_test_app();
    bootstrap_and_login(&app).await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": ADMIN_EMAIL, "password": "Wrong-Password-1" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_whoami_with_bearer_token() {
    let (_, app) = create_test_app();
    let admin: LoginResponse = bootstrap_and_login(&app).await;

    let response = send(
        &app,
        bearer_request("GET", "/api/auth/whoami", &admin.session_token, None),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let me: WhoAmIResponse = body_json(response).await;
    assert_eq!(me.email, ADMIN_EMAIL);
    assert_eq!(me.effective_role.as_deref(), Some("admin"));
}

#[tokio::test]
async fn test_whoami_without_credentials_is_unauthorized() {
    let (_, app) = create_test_app();

    let response = send(
        &app,
        Request::builder()
            .uri("/api/auth/whoami")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let error: ErrorResponse = body_json(response).await;
    assert!(error.error);
}

#[tokio::test]
async fn test_malformed_authorization_header_is_unauthorized() {
    let (_, app) = create_test_app();

    let response = send(
        &app,
        Request::builder()
            .uri("/api/auth/whoami")
            .header(header::AUTHORIZATION, "Token abc")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ends_the_session() {
    let (_, app) = create_test_app();
    let admin: LoginResponse = bootstrap_and_login(&app).await;

    let response = send(
        &app,
        bearer_request("POST", "/api/auth/logout", &admin.session_token, None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        bearer_request("GET", "/api/auth/whoami", &admin.session_token, None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_cannot_reach_admin_endpoints() {
    let (_, app) = create_test_app();
    bootstrap_and_login(&app).await;
    let customer: LoginResponse = register_and_login(&app, "fan@example.com").await;

    let users = send(
        &app,
        bearer_request("GET", "/api/admin/users", &customer.session_token, None),
    )
    .await;
    assert_eq!(users.status(), StatusCode::FORBIDDEN);

    let tiers = send(
        &app,
        bearer_request("GET", "/api/admin/pricing-tiers", &customer.session_token, None),
    )
    .await;
    assert_eq!(tiers.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_cookie_mutation_requires_csrf_token() {
    let (_, app) = create_test_app();
    let customer: LoginResponse = register_and_login(&app, "fan@example.com").await;

    let missing = send(
        &app,
        cookie_request("PUT", "/api/auth/profile", &customer, None),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::FORBIDDEN);

    let wrong = send(
        &app,
        cookie_request("PUT", "/api/auth/profile", &customer, Some("not-the-token")),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);

    let accepted = send(
        &app,
        cookie_request(
            "PUT",
            "/api/auth/profile",
            &customer,
            Some(&customer.csrf_token),
        ),
    )
    .await;
    assert_eq!(accepted.status(), StatusCode::OK);
    let me: WhoAmIResponse = body_json(accepted).await;
    assert_eq!(me.display_name, "Renamed Fan");
}

#[tokio::test]
async fn test_bearer_mutation_skips_csrf() {
    let (_, app) = create_test_app();
    let customer: LoginResponse = register_and_login(&app, "fan@example.com").await;

    let response = send(
        &app,
        bearer_request(
            "PUT",
            "/api/auth/profile",
            &customer.session_token,
            Some(&json!({ "display_name": "Renamed Fan" })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_credential_endpoints_are_rate_limited() {
    let app_state: AppState = create_limited_app_state(10_000, 2);
    let app: Router = build_router(app_state);
    let attempt = || {
        json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": "nobody@example.com", "password": "Wrong-Password-1" }),
        )
    };

    assert_eq!(send(&app, attempt()).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(send(&app, attempt()).await.status(), StatusCode::UNAUTHORIZED);

    let limited = send(&app, attempt()).await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    let error: ErrorResponse = body_json(limited).await;
    assert!(error.error);

    // Reads are only subject to the general bucket.
    let movies = send(
        &app,
        Request::builder().uri("/api/movies").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(movies.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_movie_is_not_found() {
    let (_, app) = create_test_app();

    let response = send(
        &app,
        Request::builder()
            .uri("/api/movies/999")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_movie_rating_is_bad_request() {
    let (_, app) = create_test_app();
    let admin: LoginResponse = bootstrap_and_login(&app).await;

    let response = send(
        &app,
        bearer_request(
            "POST",
            "/api/admin/movies",
            &admin.session_token,
            Some(&json!({
                "title": "Unrated",
                "duration_minutes": 95,
                "rating": "XYZ",
                "language": "English",
                "release_date": "2026-11-20",
            })),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_show_listing_rejects_time_past_calendar_end() {
    let (_, app) = create_test_app();

    let response = send(
        &app,
        Request::builder()
            .uri("/api/shows?from=9999-12-31T23:00:00-05:00")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = body_json(response).await;
    assert!(body.error);
}

async fn failing_handler() -> Result<(), HttpError> {
    Err(HttpError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        String::from("projector offline"),
    ))
}

#[tokio::test]
async fn test_server_errors_are_written_to_app_logs() {
    let app_state: AppState = create_test_app_state();
    let app: Router = Router::new()
        .route("/boom", get(failing_handler))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            record_server_errors,
        ))
        .with_state(app_state.clone());

    let response = send(
        &app,
        Request::builder().uri("/boom").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let logs: Vec<AppLogData> = app_state
        .persistence
        .lock()
        .await
        .list_logs(&LogFilter::default())
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].level, "error");
    assert_eq!(logs[0].source, "server");
    assert_eq!(logs[0].message, "projector offline");
    assert_eq!(logs[0].context.as_deref(), Some("GET /boom"));
}

#[tokio::test]
async fn test_client_errors_are_not_logged() {
    let (app_state, app) = create_test_app();

    send(
        &app,
        Request::builder()
            .uri("/api/movies/999")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    let logs: Vec<AppLogData> = app_state
        .persistence
        .lock()
        .await
        .list_logs(&LogFilter::default())
        .unwrap();
    assert!(logs.is_empty());
}
