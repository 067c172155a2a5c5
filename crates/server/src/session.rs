// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction and authentication at the server boundary.
//!
//! A session token arrives either as `Authorization: Bearer <token>` or in
//! the `marquee_session` cookie. The bearer header wins when both are sent.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use marquee_api::{AuthenticatedActor, AuthenticationService, AuthorizationService};
use marquee_audit::Cause;
use marquee_persistence::UserData;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::HttpError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "marquee_session";

/// How a request presented its session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Bearer,
    Cookie,
}

/// Finds the session token in the request headers.
///
/// A malformed `Authorization` header yields `Err` rather than falling back
/// to the cookie.
pub fn session_token(headers: &HeaderMap) -> Result<Option<(String, AuthMethod)>, SessionError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value: &str = value.to_str().map_err(|_| {
            warn!("Invalid Authorization header encoding");
            SessionError::InvalidAuthorizationHeader
        })?;
        let token: &str = value.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Authorization header does not start with 'Bearer '");
            SessionError::InvalidAuthorizationHeader
        })?;
        return Ok(Some((token.trim().to_string(), AuthMethod::Bearer)));
    }

    Ok(cookie_value(headers, SESSION_COOKIE).map(|token| (token, AuthMethod::Cookie)))
}

/// Reads one cookie from the `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Builds the `Set-Cookie` value for a new session.
pub fn session_cookie(token: &str, max_age_seconds: i64, secure: bool) -> String {
    let mut cookie: String = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Builds the `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Extractor for signed-in users.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     SessionUser(actor, user): SessionUser,
/// ) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
///     // user: UserData
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Errors
///
/// Rejects with 401 when no token is present, the `Authorization` header
/// is malformed, the session is unknown or expired, or the user is
/// disabled.
pub struct SessionUser(pub AuthenticatedActor, pub UserData);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (token, method) = session_token(&parts.headers)?.ok_or_else(|| {
            debug!("Request carries no session token");
            SessionError::MissingCredentials
        })?;

        let mut persistence = state.persistence.lock().await;
        let (actor, user, _session) =
            AuthenticationService::validate_session(&mut persistence, &token).map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            })?;

        debug!(
            user_id = actor.user_id,
            role = ?actor.effective_role(),
            method = ?method,
            "Session validated"
        );

        Ok(Self(actor, user))
    }
}

/// Extractor for admins and managers.
pub struct RequireStaff(pub AuthenticatedActor);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SessionUser(actor, _) = SessionUser::from_request_parts(parts, state).await?;
        AuthorizationService::require_staff(&actor, parts.uri.path())
            .map_err(|e| SessionError::Forbidden(e.to_string()))?;
        Ok(Self(actor))
    }
}

/// Extractor for admins.
pub struct RequireAdmin(pub AuthenticatedActor);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SessionUser(actor, _) = SessionUser::from_request_parts(parts, state).await?;
        AuthorizationService::require_admin(&actor, parts.uri.path())
            .map_err(|e| SessionError::Forbidden(e.to_string()))?;
        Ok(Self(actor))
    }
}

/// The audit cause of a request.
///
/// The ID is the client's `X-Request-Id` when sent, otherwise a fresh
/// random token. The description names the method and path.
pub struct RequestCause(pub Cause);

impl<S: Send + Sync> FromRequestParts<S> for RequestCause {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id: String = parts
            .headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map_or_else(
                || AuthenticationService::generate_token()[..16].to_string(),
                ToString::to_string,
            );
        let description: String = format!("{} {}", parts.method, parts.uri.path());
        Ok(Self(Cause::new(id, description)))
    }
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Neither a bearer token nor a session cookie was sent.
    MissingCredentials,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
    /// The user is signed in but lacks the required role.
    Forbidden(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let error: HttpError = match self {
            Self::MissingCredentials => HttpError::new(
                StatusCode::UNAUTHORIZED,
                String::from("Authentication required"),
            ),
            Self::InvalidAuthorizationHeader => HttpError::new(
                StatusCode::UNAUTHORIZED,
                String::from("Invalid Authorization header format. Expected: 'Bearer <token>'"),
            ),
            Self::InvalidSession(reason) => HttpError::new(
                StatusCode::UNAUTHORIZED,
                format!("Session validation failed: {reason}"),
            ),
            Self::Forbidden(reason) => HttpError::new(StatusCode::FORBIDDEN, reason),
        };
        error.into_response()
    }
}
