// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Registration, sign-in and the signed-in user's own account.

use axum::{
    Json,
    extract::State as AxumState,
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
};
use marquee_api::{
    AuthenticationService, BootstrapAdminRequest, BootstrapStatusResponse, ChangePasswordRequest,
    LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse,
    UpdateProfileRequest, WhoAmIResponse, bootstrap_admin, bootstrap_status, change_password,
    login, logout, register, update_profile, whoami,
};
use tracing::info;

use crate::AppState;
use crate::error::HttpError;
use crate::session::{
    RequestCause, SessionUser, clear_session_cookie, session_cookie, session_token,
};

/// Handler for POST `/api/auth/register`.
///
/// Creates a customer account. The caller signs in separately.
pub async fn handle_register(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RegisterResponse = register(&mut persistence, &req)?;
    drop(persistence);

    info!(user_id = response.user_id, "Customer registered");
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for POST `/api/auth/login`.
///
/// Returns the tokens in the body and also sets the session cookie for
/// browser clients.
pub async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse = login(&mut persistence, &req)?;
    drop(persistence);

    let cookie: String = session_cookie(
        &response.session_token,
        AuthenticationService::SESSION_LIFETIME.whole_seconds(),
        app_state.config.secure_cookies,
    );
    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(response)).into_response())
}

/// Handler for POST `/api/auth/logout`.
///
/// Always clears the cookie, even when the session had already expired.
pub async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Response, HttpError> {
    if let Ok(Some((token, _))) = session_token(&headers) {
        let mut persistence = app_state.persistence.lock().await;
        logout(&mut persistence, &token)?;
    }

    let cookie: String = clear_session_cookie(app_state.config.secure_cookies);
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(MessageResponse {
            message: String::from("Signed out"),
        }),
    )
        .into_response())
}

/// Handler for GET `/api/auth/whoami`.
pub async fn handle_whoami(SessionUser(actor, user): SessionUser) -> Json<WhoAmIResponse> {
    Json(whoami(&actor, &user))
}

/// Handler for PUT `/api/auth/profile`.
pub async fn handle_update_profile(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<WhoAmIResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(update_profile(&mut persistence, &req, &actor)?))
}

/// Handler for POST `/api/auth/password`.
///
/// Changing the password ends every session, so the cookie is cleared too.
pub async fn handle_change_password(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Response, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: MessageResponse = change_password(&mut persistence, &req, &actor)?;
    drop(persistence);

    let cookie: String = clear_session_cookie(app_state.config.secure_cookies);
    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(response)).into_response())
}

/// Handler for GET `/api/auth/bootstrap`.
pub async fn handle_bootstrap_status(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<BootstrapStatusResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(Json(bootstrap_status(&mut persistence)?))
}

/// Handler for POST `/api/auth/bootstrap`.
///
/// Creates the first admin account. Refused once any admin exists.
pub async fn handle_bootstrap_admin(
    AxumState(app_state): AxumState<AppState>,
    RequestCause(cause): RequestCause,
    Json(req): Json<BootstrapAdminRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RegisterResponse = bootstrap_admin(&mut persistence, &req, cause)?;
    drop(persistence);

    info!(user_id = response.user_id, "Initial admin account created");
    Ok((StatusCode::CREATED, Json(response)))
}
